use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert!(ease.apply(0.0).abs() < 1e-5, "{} f(0)", ease.name());
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-5, "{} f(1)", ease.name());
    }
}

#[test]
fn catalog_is_non_decreasing() {
    for ease in Ease::ALL {
        let mut prev = ease.apply(0.0);
        for i in 1..=100 {
            let v = ease.apply(i as f64 / 100.0);
            assert!(v + 1e-12 >= prev, "{} decreases at sample {i}", ease.name());
            prev = v;
        }
    }
}

#[test]
fn in_out_variants_pass_through_midpoint() {
    let mut checked = 0;
    for ease in Ease::ALL.into_iter().filter(|e| e.is_in_out()) {
        assert!((ease.apply(0.5) - 0.5).abs() < 0.01, "{}", ease.name());
        checked += 1;
    }
    assert_eq!(checked, 11);
}

#[test]
fn ease_in_lags_and_ease_out_leads_early() {
    let t = 0.1;
    for ease in Ease::ALL {
        let name = ease.name();
        if name.starts_with("easeIn") && !name.starts_with("easeInOut") && !ease.is_in_out() {
            assert!(ease.apply(t) < t, "{name}");
        }
        if name.starts_with("easeOut") {
            assert!(ease.apply(t) > t, "{name}");
        }
    }
}

#[test]
fn names_round_trip_through_lookup() {
    for ease in Ease::ALL {
        assert_eq!(Ease::from_name(ease.name()), Some(ease));
    }
    assert_eq!(Ease::from_name("bogus"), None);
}

#[test]
fn unknown_names_resolve_to_linear() {
    assert_eq!(resolve_preset("easeInOutSine"), Ease::InOutSine);
    assert_eq!(resolve_preset("definitely-not-an-ease"), Ease::Linear);
    assert_eq!(resolve_preset("definitely-not-an-ease"), Ease::Linear);
}

#[test]
fn serde_uses_catalog_names() {
    let json = serde_json::to_string(&Ease::InOutSine).unwrap();
    assert_eq!(json, "\"easeInOutSine\"");
    let back: Ease = serde_json::from_str("\"easeOutExpo\"").unwrap();
    assert_eq!(back, Ease::OutExpo);
}
