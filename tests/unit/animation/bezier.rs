use super::*;

#[test]
fn identity_controls_approximate_identity() {
    let b = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
    for i in 0..10 {
        let x = i as f64 / 9.0;
        assert!((b.apply(x) - x).abs() < 0.01, "x={x} y={}", b.apply(x));
    }
}

#[test]
fn solve_converges_for_standard_controls() {
    let b = CubicBezier::css_ease_in_out();
    for i in 1..20 {
        let x = i as f64 / 20.0;
        let s = b.solve_s_for_x(x);
        assert!((bezier_coord(s, b.x1, b.x2) - x).abs() < 1e-5);
    }
    assert!((b.apply(0.5) - 0.5).abs() < 1e-5);
}

#[test]
fn degenerate_all_zero_controls_do_not_diverge() {
    let b = CubicBezier::new(0.0, 0.0, 0.0, 0.0);
    for i in 0..=50 {
        let y = b.apply(i as f64 / 50.0);
        assert!(y.is_finite());
        assert!((0.0..=1.0).contains(&y));
    }
}

#[test]
fn controls_and_input_are_clamped() {
    let b = CubicBezier::new(-1.0, 2.0, 3.0, f64::NAN);
    assert_eq!(b, CubicBezier::new(0.0, 1.0, 1.0, 0.0));
    assert_eq!(b.apply(-5.0), 0.0);
    assert_eq!(b.apply(5.0), 1.0);
}

#[test]
fn css_presets_are_monotonic() {
    for b in [
        CubicBezier::css_ease(),
        CubicBezier::css_ease_in(),
        CubicBezier::css_ease_out(),
        CubicBezier::css_ease_in_out(),
    ] {
        let mut prev = 0.0;
        for i in 1..=100 {
            let y = b.apply(i as f64 / 100.0);
            assert!(y + 1e-9 >= prev);
            prev = y;
        }
    }
}
