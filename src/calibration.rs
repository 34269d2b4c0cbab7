//! Per-fixture emitter calibration.
//!
//! A profile describes the three color emitters of a fixture: where each one
//! sits in CIE 1976 UCS space, how much light it puts out at full drive, and
//! how its drive level relates to chromaticity position along the gamut edge
//! toward its neighbor. The profile is replaced as a unit; the engine
//! recomputes the displayed color when that happens.

use crate::color::Uv;

/// Rational response curve `f(x) = (p1 * x + p2) / (x + q1)`.
///
/// Fitted drive level of an emitter against the normalized chromaticity
/// distance along the edge toward its neighbor. The calibration tool fits
/// the curve in whichever direction keeps the pole `x = -q1` away from
/// `[0, 1]`; the sign of `p1` records that orientation (`p1 < 0` means the
/// curve was fitted directly against the edge distance, otherwise against
/// the reversed distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseFit {
    pub p1: f32,
    pub p2: f32,
    pub q1: f32,
}

impl ResponseFit {
    pub const fn new(p1: f32, p2: f32, q1: f32) -> Self {
        Self { p1, p2, q1 }
    }

    /// Drive level at normalized edge distance `d` from the emitter.
    ///
    /// Level is 1 at the emitter's own vertex (`d = 0`) and 0 at the
    /// neighbor's (`d = 1`) for any physically sensible fit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn level_at(&self, d: f64) -> f32 {
        let x = if self.p1 < 0.0 { d } else { 1.0 - d };
        let level = (f64::from(self.p1) * x + f64::from(self.p2)) / (x + f64::from(self.q1));
        level as f32
    }
}

/// One calibrated emitter: chromaticity and luminous flux at full drive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emitter {
    pub uv: Uv,
    pub flux: f32,
}

impl Emitter {
    pub const fn new(uv: Uv, flux: f32) -> Self {
        Self { uv, flux }
    }
}

/// Complete calibration of a three-emitter fixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationProfile {
    pub red: Emitter,
    pub green: Emitter,
    pub blue: Emitter,
    /// Luminous flux that corresponds to lightness 100
    pub max_flux: f32,
    /// Red level vs. normalized red-to-green edge distance
    pub red_to_green: ResponseFit,
    /// Green level vs. normalized green-to-blue edge distance
    pub green_to_blue: ResponseFit,
    /// Blue level vs. normalized blue-to-red edge distance
    pub blue_to_red: ResponseFit,
}

impl CalibrationProfile {
    /// Factory calibration of the reference fixture.
    ///
    /// Usable before any fixture-specific calibration has been taken.
    pub const DEFAULT: Self = Self {
        red: Emitter::new(Uv::new(0.5535, 0.5170), 0.5),
        green: Emitter::new(Uv::new(0.0373, 0.5856), 1.0),
        blue: Emitter::new(Uv::new(0.1679, 0.1153), 0.75),
        max_flux: 2.25,
        red_to_green: ResponseFit::new(2.9658, 0.0, 1.9658),
        green_to_blue: ResponseFit::new(1.3587, 0.0, 0.3587),
        blue_to_red: ResponseFit::new(-0.2121, 0.2121, 0.2121),
    };
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::DEFAULT
    }
}
