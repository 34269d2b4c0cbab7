mod common;

mod tests {
    use luv_light_engine::{CalibrationProfile, ColorEngine, DriveLevels, PwmChannel, WhiteLevels};

    use crate::common::MockPwm;

    const RESOLUTION: u16 = 255;

    fn engine() -> ColorEngine<MockPwm> {
        ColorEngine::new(MockPwm::new(), RESOLUTION, CalibrationProfile::DEFAULT)
            .expect("default profile must solve")
    }

    #[test]
    fn test_clamping() {
        let mut engine = engine();
        engine.set_raw(DriveLevels::new(-1.0, 2.0, 0.5));

        let raw = engine.raw();
        assert_eq!(raw.r, 0.0);
        assert_eq!(raw.g, 1.0);
        assert_eq!(raw.b, 128.0 / 255.0);
    }

    #[test]
    fn test_idempotence() {
        let mut engine = engine();
        engine.set_raw(DriveLevels::new(0.123, 0.456, 0.789));

        let first = engine.raw();
        engine.set_raw(first);
        let second = engine.raw();

        assert_eq!(first, second);
    }

    #[test]
    fn test_quantization_error_bound() {
        let mut engine = engine();
        let bound = 1.0 / (2.0 * f32::from(RESOLUTION));

        for level in [0.0, 0.15, 0.33, 0.77, 0.999, 1.0] {
            engine.set_raw(DriveLevels::new(level, level, level));
            let raw = engine.raw();
            assert!((raw.r - level).abs() <= bound, "level {level} off by more than {bound}");
            assert!((raw.g - level).abs() <= bound);
            assert!((raw.b - level).abs() <= bound);
        }
    }

    #[test]
    fn test_power_gates_the_sink_not_the_state() {
        let mut engine = engine();
        engine.set_raw(DriveLevels::new(0.25, 0.5, 0.75));
        let stored = engine.raw();

        // Off since construction: nothing reached the color channels
        assert_eq!(engine.driver().color_duties(), (0, 0, 0));

        engine.set_power(true);
        assert!(engine.is_powered());
        let (r, g, b) = engine.driver().color_duties();
        assert_eq!(f32::from(r) / 255.0, stored.r);
        assert_eq!(f32::from(g) / 255.0, stored.g);
        assert_eq!(f32::from(b) / 255.0, stored.b);

        engine.set_power(false);
        assert_eq!(engine.driver().color_duties(), (0, 0, 0));
        // Stored state survives the toggle
        assert_eq!(engine.raw(), stored);
    }

    #[test]
    fn test_power_toggle_preserves_caches() {
        let mut engine = engine();
        assert_eq!(engine.color_temperature(), Some(1900));

        engine.set_power(true);
        engine.set_power(false);
        assert_eq!(engine.color_temperature(), Some(1900));
    }

    #[test]
    fn test_raw_write_invalidates_caches() {
        let mut engine = engine();
        assert!(engine.chromaticity().is_some());
        assert!(engine.color_temperature().is_some());

        engine.set_raw(DriveLevels::new(0.1, 0.2, 0.3));
        assert!(engine.chromaticity().is_none());
        assert!(engine.color_temperature().is_none());
    }

    #[test]
    fn test_white_passthrough() {
        let mut engine = engine();

        // Whites are outside the power gate: the engine is off, the duties
        // land at the sink anyway.
        engine.set_white(WhiteLevels::new(0.5, 0.25));
        assert_eq!(engine.driver().duty(PwmChannel::WarmWhite), 128);
        assert_eq!(engine.driver().duty(PwmChannel::ColdWhite), 64);

        assert_eq!(engine.white().warm, 128.0 / 255.0);
        assert_eq!(engine.white().cold, 64.0 / 255.0);

        // And they do not disturb the color caches
        assert_eq!(engine.color_temperature(), Some(1900));
    }
}
