use super::*;

#[test]
fn parse_accepts_presets_keywords_and_bezier() {
    assert_eq!(
        Easing::parse("easeInOutSine").unwrap().as_preset(),
        Some(Ease::InOutSine)
    );
    assert!(matches!(Easing::parse("ease-in").unwrap(), Easing::Bezier(_)));
    let Easing::Bezier(b) = Easing::parse("cubic-bezier(0.1, 0.2, 0.3, 1.4)").unwrap() else {
        panic!("expected bezier");
    };
    assert_eq!(b, CubicBezier::new(0.1, 0.2, 0.3, 1.0));
}

#[test]
fn parse_rejects_malformed_bezier_only() {
    assert!(Easing::parse("cubic-bezier(0.1, 0.2)").is_err());
    assert!(Easing::parse("cubic-bezier(a, b, c, d)").is_err());
    assert_eq!(
        Easing::parse("no-such-curve").unwrap().as_preset(),
        Some(Ease::Linear)
    );
}

#[test]
fn custom_instances_have_distinct_keys() {
    let a = Easing::custom("a", |t| t);
    let b = Easing::custom("b", |t| t);
    assert_ne!(a.key(), b.key());
    assert_eq!(a.key(), a.clone().key());
}

#[test]
fn apply_clamps_input_for_custom_functions() {
    let e = Easing::custom("echo", |t| t);
    assert_eq!(e.apply(-1.0), 0.0);
    assert_eq!(e.apply(2.0), 1.0);
    assert_eq!(e.apply(f64::NAN), 0.0);
}

#[test]
fn serde_round_trips_named_forms() {
    let json = serde_json::to_string(&Easing::Preset(Ease::OutQuad)).unwrap();
    assert_eq!(json, "\"easeOutQuad\"");
    let back: Easing = serde_json::from_str("\"cubic-bezier(0.25, 0.1, 0.25, 1)\"").unwrap();
    assert!(matches!(back, Easing::Bezier(_)));
    assert!(serde_json::to_string(&Easing::custom("x", |t| t)).is_err());
}
