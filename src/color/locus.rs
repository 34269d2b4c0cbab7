use super::Uv;

/// Chromaticity of a black-body radiator at the given temperature.
///
/// Least-squares rational-polynomial fit of CIE 1976 UCS coordinates
/// against color temperature, usable between roughly 1000 K and 12000 K.
/// The fit variable is z-score normalized to keep the polynomial terms in
/// a floating-point friendly range.
#[allow(clippy::cast_possible_truncation)]
pub fn planckian_uv(kelvin: u16) -> Uv {
    let x = (f64::from(kelvin) - 5500.0) / 2599.0;
    let x2 = x * x;
    let x3 = x2 * x;
    let x4 = x2 * x2;

    let u = (-0.0001747 * x3 + 0.1833 * x2 + 0.872 * x + 1.227) / (x2 + 4.813 * x + 5.933);
    let v = (0.000311 * x4 + 0.0009124 * x3 + 0.3856 * x2 + 1.873 * x + 2.619)
        / (x2 + 4.323 * x + 5.485);

    Uv {
        u: u as f32,
        v: v as f32,
    }
}
