use super::*;

fn linear() -> Easing {
    Easing::Preset(Ease::Linear)
}

#[test]
fn boundaries_map_exactly() {
    for ease in Ease::ALL {
        let e = Easing::Preset(ease);
        assert_eq!(warp_time(0.0, 5.0, 1.5, &e), 0.0);
        assert_eq!(warp_time(5.0, 5.0, 1.5, &e), 1.5);
        assert_eq!(warp_time(-2.0, 5.0, 1.5, &e), 0.0);
        assert_eq!(warp_time(9.0, 5.0, 1.5, &e), 1.5);
    }
}

#[test]
fn linear_warp_scales_time() {
    assert!((warp_time(2.5, 5.0, 1.5, &linear()) - 0.75).abs() < 1e-12);
    for i in 0..=50 {
        let t = i as f64 * 0.1;
        assert!((warp_time(t, 5.0, 1.5, &linear()) - t * 1.5 / 5.0).abs() < 1e-9);
    }
}

#[test]
fn warped_frame_durations_sum_to_output_duration() {
    let fps = 30.0;
    let frames = (5.0 * fps) as usize;
    for ease in [Ease::Linear, Ease::InOutSine, Ease::OutExpo, Ease::InQuadOutCubic] {
        let e = Easing::Preset(ease);
        let total: f64 = (0..frames)
            .map(|i| calculate_warped_duration(i as f64 / fps, 1.0 / fps, 5.0, 1.5, &e))
            .sum();
        assert!((total - 1.5).abs() < 0.1, "{}: {total}", ease.name());
    }
}

#[test]
fn warped_duration_is_never_negative() {
    let wobble = Easing::custom("wobble", |t| t + 0.3 * (t * 20.0).sin() * t * (1.0 - t));
    for i in 0..100 {
        let d = calculate_warped_duration(i as f64 * 0.05, 0.05, 5.0, 2.0, &wobble);
        assert!(d >= 0.0);
    }
}

#[test]
fn validation_accepts_catalog_and_flags_problems() {
    let ok = validate_warp_function("easeInOutSine", Some(5.0), Some(1.5));
    assert!(ok.valid);
    assert!(ok.issues.is_empty());

    let unknown = validate_warp_function("nope", None, None);
    assert!(!unknown.valid);
    assert!(unknown.issues[0].contains("unknown easing"));

    let shifted = Easing::custom("shifted", |t| 0.2 + 0.8 * t);
    let bad = validate_warp_function(&shifted, Some(5.0), Some(1.0));
    assert!(!bad.valid);
    assert!(bad.issues.iter().any(|i| i.contains("map 0 to 0")));

    let bad_dur = validate_warp_function(&linear(), Some(0.0), None);
    assert!(!bad_dur.valid);
}

#[test]
fn linear_curve_has_unit_speed() {
    let a = analyze_warp_curve(&linear(), 5.0, 5.0, 20);
    assert_eq!(a.samples.len(), 20);
    for s in &a.samples {
        assert!((s.speed - 1.0).abs() < 1e-6);
    }
    assert!((a.avg_speed - 1.0).abs() < 1e-6);
    assert!((a.min_speed - 1.0).abs() < 1e-6);
    assert!((a.max_speed - 1.0).abs() < 1e-6);
}

#[test]
fn in_out_curve_is_slow_at_edges_fast_in_middle() {
    let a = analyze_warp_curve(&Easing::Preset(Ease::InOutCubic), 5.0, 1.5, 11);
    assert!(a.samples[0].speed < 0.1);
    assert!(a.samples[5].speed > 1.0);
    assert!(a.max_speed > a.avg_speed && a.avg_speed > a.min_speed);
    assert_eq!(a.samples[10].output_time, 1.5);
    assert!(analyze_warp_curve(&linear(), 5.0, 1.5, 0).samples.is_empty());
}

#[test]
fn inverse_short_circuits_boundaries() {
    let e = Easing::Preset(Ease::InOutSine);
    assert_eq!(inverse_progress(&e, 0.0), 0.0);
    assert_eq!(inverse_progress(&e, 1.0), 1.0);
    assert_eq!(inverse_progress(&e, -3.0), 0.0);
}

#[test]
fn inverse_recovers_progress() {
    for ease in Ease::ALL {
        let e = Easing::Preset(ease);
        for i in 1..10 {
            let p = i as f64 / 10.0;
            let x = e.apply(p);
            let back = inverse_progress(&e, x);
            assert!((e.apply(back) - x).abs() < 1e-4, "{}", ease.name());
        }
    }
}

#[test]
fn non_monotonic_easing_warns_once_per_instance() {
    let warned = WarnOnce::new();
    let zigzag = Easing::custom("zigzag", |t| if t < 0.5 { 2.0 * t } else { 2.0 - 2.0 * t + t });
    assert!(!is_monotonic(&zigzag));
    for i in 1..20 {
        let v = inverse_progress_with(&warned, &zigzag, false, i as f64 / 20.0);
        assert!(v.is_finite());
        assert!((0.0..=1.0).contains(&v));
    }
    assert_eq!(warned.emitted(), 1);

    let other = Easing::custom("zigzag", |t| if t < 0.5 { 2.0 * t } else { 1.5 - t });
    inverse_progress_with(&warned, &other, false, 0.3);
    inverse_progress_with(&warned, &other, false, 0.6);
    assert_eq!(warned.emitted(), 2);
}

#[test]
fn time_warp_places_samples_on_output_timeline() {
    let warp = TimeWarp::new(linear(), 5.0, 1.5);
    assert!(warp.is_monotonic());
    assert!((warp.output_time_for_source(2.5) - 0.75).abs() < 1e-6);
    assert_eq!(warp.output_time_for_source(0.0), 0.0);
    assert_eq!(warp.output_time_for_source(5.0), 1.5);
}
