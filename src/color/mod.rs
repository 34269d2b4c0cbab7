mod locus;

pub use locus::planckian_uv;
use smart_leds::RGB;

/// Normalized per-emitter color drive levels in `[0, 1]`.
pub type DriveLevels = RGB<f32>;

/// CIE 1976 UCS chromaticity coordinate (u', v').
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

impl Uv {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// CIE 1976 UCS chromaticity plus lightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Luv {
    /// Lightness L*, 0..=100 for physically sensible targets
    pub l: f32,
    pub u: f32,
    pub v: f32,
}

impl Luv {
    pub const fn new(l: f32, u: f32, v: f32) -> Self {
        Self { l, u, v }
    }

    pub const fn uv(&self) -> Uv {
        Uv {
            u: self.u,
            v: self.v,
        }
    }
}

/// Normalized warm/cold white drive levels in `[0, 1]`.
///
/// White channels are pass-through: the chromaticity solver never drives
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WhiteLevels {
    pub warm: f32,
    pub cold: f32,
}

impl WhiteLevels {
    pub const fn new(warm: f32, cold: f32) -> Self {
        Self { warm, cold }
    }
}

/// Convert CIE 1976 lightness to relative luminance.
///
/// The usual `((L + 16) / 116)^3` relation, except that non-positive
/// lightness maps to exactly zero so the black point is a defined boundary
/// rather than a small residual flux.
pub fn lightness_to_luma(l: f32) -> f32 {
    if l <= 0.0 {
        return 0.0;
    }
    let y = (l + 16.0) / 116.0;
    y * y * y
}
