mod tests {
    use luv_light_engine::planckian_uv;

    #[test]
    fn test_known_points_on_the_locus() {
        // Checked against CIE 1976 UCS coordinates of the black body;
        // the fit is good to a few thousandths over the working range.
        let warm = planckian_uv(2000);
        assert!((warm.u - 0.3048).abs() < 5e-3, "u at 2000 K: {}", warm.u);
        assert!((warm.v - 0.5381).abs() < 5e-3, "v at 2000 K: {}", warm.v);

        let daylight = planckian_uv(6500);
        assert!((daylight.u - 0.2004).abs() < 5e-3, "u at 6500 K: {}", daylight.u);
        assert!((daylight.v - 0.4655).abs() < 5e-3, "v at 6500 K: {}", daylight.v);
    }

    #[test]
    fn test_u_decreases_with_temperature() {
        // Hotter radiators sit further toward blue: u' falls monotonically
        let mut previous = planckian_uv(1500).u;
        for kelvin in [2000, 2700, 3500, 4500, 5500, 6500, 8000, 10000] {
            let current = planckian_uv(kelvin).u;
            assert!(current < previous, "u rose between steps at {kelvin} K");
            previous = current;
        }
    }
}
