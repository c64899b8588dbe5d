//! Time-warp mapping between an input (source) timeline and an output timeline.
//!
//! The forward mapping is `warp(t) = output_duration * f(clamp(t / input_duration, 0, 1))`.
//! Frame retiming needs the inverse: given where a source sample sits on the source timeline,
//! find where it belongs on the output timeline. The inverse is only well defined for
//! non-decreasing easings; anything else falls back to the direct mapping.

use std::sync::LazyLock;

use crate::animation::ease::{Ease, resolve_preset};
use crate::animation::easing::{Easing, EasingKey};
use crate::foundation::warn_once::WarnOnce;

const BOUNDARY_TOLERANCE: f64 = 1e-5;
const INVERSE_ITERATIONS: usize = 32;
const MONOTONIC_PROBES: usize = 100;
const DERIVATIVE_STEP: f64 = 1e-4;

static NON_MONOTONIC: LazyLock<WarnOnce<EasingKey>> = LazyLock::new(WarnOnce::new);

/// Map input-timeline instant `t` onto the output timeline.
///
/// `t` is clamped to `[0, input_duration]`; the boundaries map exactly to `0` and
/// `output_duration`.
pub fn warp_time(t: f64, input_duration: f64, output_duration: f64, easing: &Easing) -> f64 {
    if input_duration <= 0.0 || !t.is_finite() {
        return 0.0;
    }
    let t = t.clamp(0.0, input_duration);
    if t == 0.0 {
        return 0.0;
    }
    if t == input_duration {
        return output_duration;
    }
    output_duration * easing.apply(t / input_duration)
}

/// Output-timeline length of the input segment `[segment_start, segment_start + segment_len]`.
pub fn calculate_warped_duration(
    segment_start: f64,
    segment_len: f64,
    input_duration: f64,
    output_duration: f64,
    easing: &Easing,
) -> f64 {
    let a = warp_time(segment_start, input_duration, output_duration, easing);
    let b = warp_time(
        segment_start + segment_len,
        input_duration,
        output_duration,
        easing,
    );
    (b - a).max(0.0)
}

/// An easing reference for [`validate_warp_function`]: either a preset name or a resolved value.
#[derive(Clone, Copy, Debug)]
pub enum EasingRef<'a> {
    Name(&'a str),
    Easing(&'a Easing),
}

impl<'a> From<&'a str> for EasingRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::Name(s)
    }
}

impl<'a> From<&'a Easing> for EasingRef<'a> {
    fn from(e: &'a Easing) -> Self {
        Self::Easing(e)
    }
}

/// Outcome of [`validate_warp_function`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct WarpValidation {
    pub valid: bool,
    /// Human-readable problems; empty when `valid`.
    pub issues: Vec<String>,
}

/// Structural sanity check of an easing for use as a time warp.
pub fn validate_warp_function<'a>(
    easing: impl Into<EasingRef<'a>>,
    input_duration: Option<f64>,
    output_duration: Option<f64>,
) -> WarpValidation {
    let mut issues = Vec::new();
    let resolved;
    let easing = match easing.into() {
        EasingRef::Easing(e) => e,
        EasingRef::Name(name) => {
            match Ease::from_name(name) {
                Some(ease) => resolved = Easing::Preset(ease),
                None => {
                    issues.push(format!("unknown easing '{name}', linear will be used"));
                    resolved = Easing::Preset(resolve_preset(name));
                }
            }
            &resolved
        }
    };

    let start = easing.apply(0.0);
    let end = easing.apply(1.0);
    if !start.is_finite() || start.abs() > BOUNDARY_TOLERANCE {
        issues.push(format!("easing must map 0 to 0, got {start}"));
    }
    if !end.is_finite() || (end - 1.0).abs() > BOUNDARY_TOLERANCE {
        issues.push(format!("easing must map 1 to 1, got {end}"));
    }
    if !is_monotonic(easing) {
        issues.push("easing is not non-decreasing; frame retiming will use direct mapping".into());
    }

    let d_in = input_duration.unwrap_or(1.0);
    let d_out = output_duration.unwrap_or(d_in);
    if !(d_in.is_finite() && d_in > 0.0) {
        issues.push(format!("input duration must be > 0, got {d_in}"));
    }
    if !(d_out.is_finite() && d_out > 0.0) {
        issues.push(format!("output duration must be > 0, got {d_out}"));
    }
    if issues.is_empty() {
        let first = warp_time(0.0, d_in, d_out, easing);
        let last = warp_time(d_in, d_in, d_out, easing);
        if first != 0.0 || (last - d_out).abs() > BOUNDARY_TOLERANCE {
            issues.push(format!(
                "warp boundaries map to [{first}, {last}], expected [0, {d_out}]"
            ));
        }
    }

    WarpValidation {
        valid: issues.is_empty(),
        issues,
    }
}

/// One sample of [`analyze_warp_curve`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SpeedSample {
    /// Input-timeline instant.
    pub input_time: f64,
    /// Warped output-timeline instant.
    pub output_time: f64,
    /// Local slope of the warp relative to a uniform (linear) warp; `1.0` means unchanged pace.
    pub speed: f64,
}

/// Speed profile of a warp curve, for display and validation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CurveAnalysis {
    pub samples: Vec<SpeedSample>,
    pub min_speed: f64,
    pub max_speed: f64,
    pub avg_speed: f64,
}

/// Sample the warp at `sample_count` evenly spaced input instants.
pub fn analyze_warp_curve(
    easing: &Easing,
    input_duration: f64,
    output_duration: f64,
    sample_count: usize,
) -> CurveAnalysis {
    if sample_count == 0 || input_duration <= 0.0 {
        return CurveAnalysis::default();
    }

    let mut samples = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let p = if sample_count == 1 {
            0.0
        } else {
            i as f64 / (sample_count - 1) as f64
        };
        let input_time = p * input_duration;
        samples.push(SpeedSample {
            input_time,
            output_time: warp_time(input_time, input_duration, output_duration, easing),
            speed: slope(easing, p),
        });
    }

    let min_speed = samples.iter().map(|s| s.speed).fold(f64::INFINITY, f64::min);
    let max_speed = samples
        .iter()
        .map(|s| s.speed)
        .fold(f64::NEG_INFINITY, f64::max);
    let avg_speed = samples.iter().map(|s| s.speed).sum::<f64>() / samples.len() as f64;

    CurveAnalysis {
        samples,
        min_speed,
        max_speed,
        avg_speed,
    }
}

// Finite-difference derivative of the easing, one-sided at the ends.
fn slope(easing: &Easing, p: f64) -> f64 {
    let lo = (p - DERIVATIVE_STEP).max(0.0);
    let hi = (p + DERIVATIVE_STEP).min(1.0);
    (easing.apply(hi) - easing.apply(lo)) / (hi - lo)
}

/// `true` when the easing never decreases over uniform probing of `[0, 1]`.
pub fn is_monotonic(easing: &Easing) -> bool {
    if matches!(easing, Easing::Preset(_)) {
        return true;
    }
    let mut prev = easing.apply(0.0);
    if !prev.is_finite() {
        return false;
    }
    for i in 1..=MONOTONIC_PROBES {
        let v = easing.apply(i as f64 / MONOTONIC_PROBES as f64);
        if !v.is_finite() || v + 1e-12 < prev {
            return false;
        }
        prev = v;
    }
    true
}

/// Find output progress `p` with `easing(p) ≈ source_progress` by bounded bisection.
///
/// Non-monotonic easings cannot be inverted; they fall back to the direct mapping
/// `easing(source_progress)` and log one warning per distinct easing instance.
pub fn inverse_progress(easing: &Easing, source_progress: f64) -> f64 {
    inverse_progress_with(&NON_MONOTONIC, easing, is_monotonic(easing), source_progress)
}

pub(crate) fn inverse_progress_with(
    warned: &WarnOnce<EasingKey>,
    easing: &Easing,
    monotonic: bool,
    source_progress: f64,
) -> f64 {
    let x = if source_progress.is_nan() {
        0.0
    } else {
        source_progress.clamp(0.0, 1.0)
    };
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    if !monotonic {
        if warned.first(easing.key()) {
            tracing::warn!(easing = %easing, "non-monotonic easing, using direct mapping");
        }
        let direct = easing.apply(x);
        return if direct.is_finite() {
            direct.clamp(0.0, 1.0)
        } else {
            x
        };
    }

    let (mut lo, mut hi) = (0.0f64, 1.0f64);
    for _ in 0..INVERSE_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if easing.apply(mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}

/// Per-job time-warp mapping: an easing plus the two durations it stretches between.
///
/// The monotonicity probe runs once at construction.
#[derive(Clone, Debug)]
pub struct TimeWarp {
    easing: Easing,
    input_duration: f64,
    output_duration: f64,
    monotonic: bool,
}

impl TimeWarp {
    pub fn new(easing: Easing, input_duration: f64, output_duration: f64) -> Self {
        let monotonic = is_monotonic(&easing);
        Self {
            easing,
            input_duration,
            output_duration,
            monotonic,
        }
    }

    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    pub fn input_duration(&self) -> f64 {
        self.input_duration
    }

    pub fn output_duration(&self) -> f64 {
        self.output_duration
    }

    pub fn is_monotonic(&self) -> bool {
        self.monotonic
    }

    /// Forward mapping, see [`warp_time`].
    pub fn warp(&self, t: f64) -> f64 {
        warp_time(t, self.input_duration, self.output_duration, &self.easing)
    }

    /// Output-timeline instant at which the source sample stamped `source_time` belongs.
    pub fn output_time_for_source(&self, source_time: f64) -> f64 {
        if self.input_duration <= 0.0 {
            return 0.0;
        }
        let progress = source_time / self.input_duration;
        inverse_progress_with(&NON_MONOTONIC, &self.easing, self.monotonic, progress)
            * self.output_duration
    }
}

#[cfg(test)]
#[path = "../../tests/unit/warp/mapper.rs"]
mod tests;
