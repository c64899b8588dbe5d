use super::*;

#[test]
fn linear_lut_is_identity() {
    assert_eq!(
        compute_easing_lut("linear", 11),
        vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
    );
}

#[test]
fn degenerate_sizes() {
    assert_eq!(compute_easing_lut("easeInOutSine", 1), vec![0]);
    assert!(compute_easing_lut("easeInOutSine", 0).is_empty());
}

#[test]
fn unknown_preset_uses_linear_table() {
    assert_eq!(
        compute_easing_lut("not-a-preset", 6),
        compute_easing_lut("linear", 6)
    );
}

#[test]
fn lut_is_bounded_and_non_decreasing() {
    for ease in Ease::ALL {
        let lut = compute_easing_lut(ease.name(), 48);
        assert_eq!(lut.len(), 48);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[47], 47);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]), "{}", ease.name());
    }
}

#[test]
fn lut_matches_mapper_sampling() {
    let e = Easing::Preset(Ease::InOutCubic);
    let lut = easing_lut(&e, 10);
    for (i, &v) in lut.iter().enumerate() {
        let expected = (crate::warp::mapper::warp_time(i as f64, 9.0, 9.0, &e)).round() as usize;
        assert_eq!(v, expected);
    }
}

#[test]
fn closed_form_remap_only_for_invertible_presets() {
    let f = closed_form_time_remap(Ease::InQuad, 5.0, 1.5).unwrap();
    assert!(f.starts_with("setpts=1.500000*sqrt("));
    assert!(f.ends_with("/TB"));
    assert!(closed_form_time_remap(Ease::Linear, 5.0, 5.0).is_some());
    assert!(closed_form_time_remap(Ease::InOutExpo, 5.0, 1.5).is_none());
}

// Split a filter chain the way ffmpeg's graph parser does: on commas that are neither
// backslash-escaped nor inside single quotes. Parentheses do not group.
fn chain_elements(chain: &str) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut quoted = false;
    let mut chars = chain.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let cur = out.last_mut().unwrap();
                cur.push(c);
                if let Some(next) = chars.next() {
                    cur.push(next);
                }
            }
            '\'' => {
                quoted = !quoted;
                out.last_mut().unwrap().push(c);
            }
            ',' if !quoted => out.push(String::new()),
            _ => out.last_mut().unwrap().push(c),
        }
    }
    out
}

#[test]
fn closed_form_remap_is_one_filter_chain_element() {
    for ease in Ease::ALL {
        let Some(filter) = closed_form_time_remap(ease, 5.0, 2.0) else {
            continue;
        };
        let elements = chain_elements(&format!("{filter},fps=30"));
        assert_eq!(elements.len(), 2, "{}: {elements:?}", ease.name());
        assert!(elements[0].starts_with("setpts="));
        assert_eq!(elements[1], "fps=30");
    }
}

#[test]
fn closed_form_remap_escapes_every_comma() {
    let f = closed_form_time_remap(Ease::InOutSine, 5.0, 5.0).unwrap();
    assert!(f.contains("min(max(T/5.000000\\,0)\\,1)"));
    assert_eq!(f.matches(',').count(), f.matches("\\,").count());
}
