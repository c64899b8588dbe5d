use crate::animation::ease::{Ease, resolve_preset};
use crate::animation::easing::Easing;

/// Output-frame → source-frame lookup table for a named preset.
///
/// Entry `i` is `round(f(i / (n - 1)) * (n - 1))` clamped to `[0, n - 1]`. Unknown names use the
/// linear table.
pub fn compute_easing_lut(name: &str, frame_count: usize) -> Vec<usize> {
    easing_lut(&Easing::Preset(resolve_preset(name)), frame_count)
}

/// [`compute_easing_lut`] for an already-resolved easing.
pub fn easing_lut(easing: &Easing, frame_count: usize) -> Vec<usize> {
    match frame_count {
        0 => Vec::new(),
        1 => vec![0],
        n => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| {
                    let v = (easing.apply(i as f64 / last) * last).round();
                    if v.is_finite() {
                        v.clamp(0.0, last) as usize
                    } else {
                        0
                    }
                })
                .collect()
        }
    }
}

/// Closed-form inverse `f⁻¹(x)` of a preset as an ffmpeg expression over `x`, when one exists.
fn inverse_expr(ease: Ease, x: &str) -> Option<String> {
    Some(match ease {
        Ease::Linear => x.to_string(),
        Ease::InQuad => format!("sqrt({x})"),
        Ease::OutQuad => format!("(1-sqrt(1-{x}))"),
        Ease::InCubic => format!("pow({x},1/3)"),
        Ease::OutCubic => format!("(1-pow(1-{x},1/3))"),
        Ease::InSine => format!("(2/PI*acos(1-{x}))"),
        Ease::OutSine => format!("(2/PI*asin({x}))"),
        Ease::InOutSine => format!("(acos(1-2*{x})/PI)"),
        _ => return None,
    })
}

/// `setpts` filter that retimes a clip of `input_duration` seconds onto `output_duration`
/// seconds along `ease`, or `None` when the preset has no closed-form inverse.
///
/// The result is escaped for use as one element of a `-vf` filter chain.
pub fn closed_form_time_remap(
    ease: Ease,
    input_duration: f64,
    output_duration: f64,
) -> Option<String> {
    let x = format!("min(max(T/{input_duration:.6},0),1)");
    let inv = inverse_expr(ease, &x)?;
    let expr = format!("{output_duration:.6}*{inv}/TB");
    // Unescaped commas would split the filter chain.
    Some(format!("setpts={}", expr.replace(',', "\\,")))
}

#[cfg(test)]
#[path = "../../tests/unit/warp/lut.rs"]
mod tests;
