//! The color engine.
//!
//! Owns the drive state of one five-channel fixture and keeps three views of
//! it consistent: normalized drive levels (ground truth), a CIE 1976 UCS
//! chromaticity + lightness, and a correlated color temperature. Perceptual
//! requests are lowered through the calibrated solver into quantized PWM
//! duties; raw requests bypass the solver and invalidate the perceptual
//! caches.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::calibration::CalibrationProfile;
use crate::color::{DriveLevels, Luv, Uv, WhiteLevels, lightness_to_luma, planckian_uv};
use crate::solver::{SolverError, mix_coefficient};
use crate::{PwmChannel, PwmOutput};

/// Lightness shown before any perceptual request has been made.
pub const DEFAULT_LIGHTNESS: f32 = 50.0;

/// Color temperature shown before any perceptual request has been made.
pub const DEFAULT_KELVIN: u16 = 1900;

/// Which representation last set the drive levels.
///
/// The levels themselves are always valid; the perceptual caches are only
/// meaningful when they produced the levels. A temperature request always
/// goes through a chromaticity, so the `Temperature` variant carries both
/// and "temperature valid implies chromaticity valid" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSource {
    /// Levels were written directly; no perceptual meaning can be derived
    /// from them.
    Raw,
    /// Levels were solved from this chromaticity.
    Chromaticity(Uv),
    /// Levels were solved from this chromaticity, which in turn came from
    /// this color temperature.
    Temperature(Uv, u16),
}

/// Color engine for a five-channel PWM fixture.
///
/// Single-writer by design: all operations are synchronous computation plus
/// writes to the output sink. Callers running in concurrent contexts must
/// serialize access externally (see [`crate::intent`]).
pub struct ColorEngine<D: PwmOutput> {
    driver: D,
    resolution: u16,
    powered: bool,

    /// Stored color levels, already quantized to the sink's resolution
    levels: DriveLevels,
    /// Stored white levels, already quantized
    white: WhiteLevels,
    source: ColorSource,
    /// Last requested lightness; defined even when no chromaticity is cached
    lightness: f32,

    profile: CalibrationProfile,
}

impl<D: PwmOutput> ColorEngine<D> {
    /// Create an engine over `driver` with the given PWM resolution
    /// (the maximum representable duty, e.g. 255 or 1023).
    ///
    /// All five channels are driven to zero, the engine starts powered off,
    /// and the default warm-white working point
    /// ([`DEFAULT_LIGHTNESS`], [`DEFAULT_KELVIN`]) is precomputed so the
    /// first power-on shows a defined color.
    pub fn new(
        driver: D,
        resolution: u16,
        profile: CalibrationProfile,
    ) -> Result<Self, SolverError> {
        let mut engine = Self {
            driver,
            resolution,
            powered: false,
            levels: DriveLevels::default(),
            white: WhiteLevels::default(),
            source: ColorSource::Raw,
            lightness: DEFAULT_LIGHTNESS,
            profile,
        };

        for channel in [
            PwmChannel::Red,
            PwmChannel::Green,
            PwmChannel::Blue,
            PwmChannel::WarmWhite,
            PwmChannel::ColdWhite,
        ] {
            engine.driver.write(channel, 0);
        }

        engine.set_color_temperature(Some(DEFAULT_LIGHTNESS), DEFAULT_KELVIN)?;
        Ok(engine)
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Turn the fixture on or off.
    ///
    /// Turning on re-applies the stored levels through the quantization
    /// path; since they are already quantized this is idempotent. Turning
    /// off zeroes the color channels at the sink without touching stored
    /// state. White channels are outside the power gate.
    pub fn set_power(&mut self, on: bool) {
        #[cfg(feature = "esp32-log")]
        println!("light power: {}", on);

        self.powered = on;
        if on {
            self.apply_levels(self.levels, self.source);
        } else {
            self.driver.write(PwmChannel::Red, 0);
            self.driver.write(PwmChannel::Green, 0);
            self.driver.write(PwmChannel::Blue, 0);
        }
    }

    /// Stored color levels, normalized and already quantized.
    pub fn raw(&self) -> DriveLevels {
        self.levels
    }

    /// Set color levels directly.
    ///
    /// Components are clamped to `[0, 1]` and quantized; the stored value
    /// is re-derived from the quantized duty so that re-applying it never
    /// changes the physical output. Direct writes carry no perceptual
    /// meaning, so the chromaticity and temperature caches are dropped.
    pub fn set_raw(&mut self, levels: DriveLevels) {
        self.apply_levels(levels, ColorSource::Raw);
    }

    /// Stored white levels, normalized and already quantized.
    pub fn white(&self) -> WhiteLevels {
        self.white
    }

    /// Set the white channels.
    ///
    /// Pass-through only: whites are not part of the color mix, do not
    /// affect the perceptual caches and are not gated by power.
    pub fn set_white(&mut self, levels: WhiteLevels) {
        let (warm_duty, warm) = self.quantize(levels.warm);
        let (cold_duty, cold) = self.quantize(levels.cold);
        self.driver.write(PwmChannel::WarmWhite, warm_duty);
        self.driver.write(PwmChannel::ColdWhite, cold_duty);
        self.white = WhiteLevels { warm, cold };
    }

    /// Chromaticity + lightness of the current output, if the levels were
    /// produced by a perceptual request.
    pub fn chromaticity(&self) -> Option<Luv> {
        match self.source {
            ColorSource::Raw => None,
            ColorSource::Chromaticity(uv) | ColorSource::Temperature(uv, _) => {
                Some(Luv::new(self.lightness, uv.u, uv.v))
            }
        }
    }

    /// Set the output color by chromaticity and lightness.
    ///
    /// Solves the calibrated mixing model for the three emitters, scales
    /// the mix to the requested lightness and clips it to the physical
    /// gamut, then hands the result to the raw-level path. On solver
    /// failure the engine is left unchanged.
    pub fn set_chromaticity(&mut self, target: Luv) -> Result<(), SolverError> {
        let lightness = target.l.max(0.0);
        let uv = target.uv();
        let p = self.profile;

        let coefficients = DriveLevels::new(
            mix_coefficient(uv, p.red.uv, p.green.uv, p.blue.uv, p.red_to_green, p.green_to_blue)?,
            mix_coefficient(uv, p.green.uv, p.blue.uv, p.red.uv, p.green_to_blue, p.blue_to_red)?,
            mix_coefficient(uv, p.blue.uv, p.red.uv, p.green.uv, p.blue_to_red, p.red_to_green)?,
        );

        let levels = self.luma_normalized(coefficients, lightness);
        self.apply_levels(levels, ColorSource::Chromaticity(uv));
        self.lightness = lightness;
        Ok(())
    }

    /// Color temperature of the current output, if the levels were produced
    /// by a temperature request.
    pub fn color_temperature(&self) -> Option<u16> {
        match self.source {
            ColorSource::Temperature(_, kelvin) => Some(kelvin),
            _ => None,
        }
    }

    /// Set the output color by correlated color temperature.
    ///
    /// The temperature is mapped onto the black-body locus and lowered into
    /// a chromaticity request. `None` lightness keeps the engine's current
    /// lightness.
    pub fn set_color_temperature(
        &mut self,
        lightness: Option<f32>,
        kelvin: u16,
    ) -> Result<(), SolverError> {
        let l = lightness.unwrap_or(self.lightness);
        let uv = planckian_uv(kelvin);
        self.set_chromaticity(Luv::new(l, uv.u, uv.v))?;
        self.source = ColorSource::Temperature(uv, kelvin);
        Ok(())
    }

    /// Last requested lightness. Defined from construction on; never
    /// negative.
    pub fn lightness(&self) -> f32 {
        self.lightness
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Maximum representable duty of the output sink.
    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    /// Get a reference to the output driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Which representation last set the drive levels.
    pub fn source(&self) -> ColorSource {
        self.source
    }

    /// Replace the calibration profile and recompute the displayed color.
    ///
    /// Recomputation starts from the most specific still-valid cache: the
    /// color temperature if one is cached, else the chromaticity, else the
    /// levels are left alone (raw levels have no perceptual meaning to
    /// re-derive). If recomputation fails under the new profile, the old
    /// profile is restored and the engine is unchanged.
    pub fn calibrate(&mut self, profile: CalibrationProfile) -> Result<(), SolverError> {
        let previous = core::mem::replace(&mut self.profile, profile);

        let result = match self.source {
            ColorSource::Temperature(_, kelvin) => self.set_color_temperature(None, kelvin),
            ColorSource::Chromaticity(uv) => {
                self.set_chromaticity(Luv::new(self.lightness, uv.u, uv.v))
            }
            ColorSource::Raw => Ok(()),
        };

        if let Err(error) = result {
            #[cfg(feature = "esp32-log")]
            println!("calibration rejected: {:?}", error);

            self.profile = previous;
            return Err(error);
        }
        Ok(())
    }

    /// Clamp, quantize, forward and store color levels.
    ///
    /// The single mutation point for [`DriveLevels`]: every path that
    /// changes the color output goes through here, so the stored levels are
    /// always consistent with the sink's quantization.
    fn apply_levels(&mut self, levels: DriveLevels, source: ColorSource) {
        let (red_duty, red) = self.quantize(levels.r);
        let (green_duty, green) = self.quantize(levels.g);
        let (blue_duty, blue) = self.quantize(levels.b);

        if self.powered {
            self.driver.write(PwmChannel::Red, red_duty);
            self.driver.write(PwmChannel::Green, green_duty);
            self.driver.write(PwmChannel::Blue, blue_duty);
        }

        self.levels = DriveLevels::new(red, green, blue);
        self.source = source;
    }

    /// Clamp a normalized level and round it to the sink's resolution,
    /// ties up. Returns the duty and the level it actually represents.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn quantize(&self, level: f32) -> (u16, f32) {
        let clamped = level.clamp(0.0, 1.0);
        let duty = (clamped * f32::from(self.resolution) + 0.5) as u16;
        (duty, f32::from(duty) / f32::from(self.resolution))
    }

    /// Scale unscaled mixing coefficients to the requested lightness and
    /// clip to the gamut.
    ///
    /// The flux the unscaled mix would produce is compared against the flux
    /// the lightness requires; a zero-flux mix (target at the black point)
    /// short-circuits to all-zero instead of dividing by zero. If scaling
    /// pushes any coefficient past full drive, all three are scaled down
    /// together so the maximum is exactly 1 - the clip preserves channel
    /// ratios and never scales up.
    fn luma_normalized(&self, coefficients: DriveLevels, lightness: f32) -> DriveLevels {
        let p = &self.profile;
        let produced = (coefficients.r * p.red.flux
            + coefficients.g * p.green.flux
            + coefficients.b * p.blue.flux)
            / p.max_flux;
        if produced <= 0.0 {
            return DriveLevels::new(0.0, 0.0, 0.0);
        }

        let scale = lightness_to_luma(lightness) / produced;
        let mut levels = DriveLevels::new(
            coefficients.r * scale,
            coefficients.g * scale,
            coefficients.b * scale,
        );

        let max = levels.r.max(levels.g).max(levels.b);
        if max > 1.0 {
            levels.r /= max;
            levels.g /= max;
            levels.b /= max;
        }
        levels
    }
}
