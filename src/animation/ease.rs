use std::f64::consts::PI;
use std::sync::LazyLock;

use crate::foundation::warn_once::WarnOnce;

/// Closed-form easing presets used to shape a speed curve.
///
/// Every preset maps `[0, 1]` onto `[0, 1]` with `f(0) = 0`, `f(1) = 1` and is non-decreasing.
/// The hybrid presets ease in with one family and out with another; they pass through `0.5` at
/// the midpoint like the `InOut` presets but are asymmetric around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Identity mapping.
    #[serde(rename = "linear")]
    Linear,
    /// Quadratic ease-in.
    #[serde(rename = "easeInQuad")]
    InQuad,
    /// Quadratic ease-out.
    #[serde(rename = "easeOutQuad")]
    OutQuad,
    /// Quadratic ease-in/out.
    #[serde(rename = "easeInOutQuad")]
    InOutQuad,
    /// Cubic ease-in.
    #[serde(rename = "easeInCubic")]
    InCubic,
    /// Cubic ease-out.
    #[serde(rename = "easeOutCubic")]
    OutCubic,
    /// Cubic ease-in/out.
    #[serde(rename = "easeInOutCubic")]
    InOutCubic,
    /// Quartic ease-in.
    #[serde(rename = "easeInQuart")]
    InQuart,
    /// Quartic ease-out.
    #[serde(rename = "easeOutQuart")]
    OutQuart,
    /// Quartic ease-in/out.
    #[serde(rename = "easeInOutQuart")]
    InOutQuart,
    /// Quintic ease-in.
    #[serde(rename = "easeInQuint")]
    InQuint,
    /// Quintic ease-out.
    #[serde(rename = "easeOutQuint")]
    OutQuint,
    /// Quintic ease-in/out.
    #[serde(rename = "easeInOutQuint")]
    InOutQuint,
    /// Sinusoidal ease-in.
    #[serde(rename = "easeInSine")]
    InSine,
    /// Sinusoidal ease-out.
    #[serde(rename = "easeOutSine")]
    OutSine,
    /// Sinusoidal ease-in/out.
    #[serde(rename = "easeInOutSine")]
    InOutSine,
    /// Exponential ease-in.
    #[serde(rename = "easeInExpo")]
    InExpo,
    /// Exponential ease-out.
    #[serde(rename = "easeOutExpo")]
    OutExpo,
    /// Exponential ease-in/out.
    #[serde(rename = "easeInOutExpo")]
    InOutExpo,
    /// Circular ease-in.
    #[serde(rename = "easeInCirc")]
    InCirc,
    /// Circular ease-out.
    #[serde(rename = "easeOutCirc")]
    OutCirc,
    /// Circular ease-in/out.
    #[serde(rename = "easeInOutCirc")]
    InOutCirc,
    /// Quadratic first half, cubic second half.
    #[serde(rename = "easeInQuadOutCubic")]
    InQuadOutCubic,
    /// Cubic first half, quadratic second half.
    #[serde(rename = "easeInCubicOutQuad")]
    InCubicOutQuad,
    /// Gentle sine start, sharp exponential settle.
    #[serde(rename = "easeInSineOutExpo")]
    InSineOutExpo,
    /// Sharp exponential start, gentle sine settle.
    #[serde(rename = "easeInExpoOutSine")]
    InExpoOutSine,
}

impl Ease {
    /// Every catalog entry, in display order.
    pub const ALL: [Ease; 26] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InQuart,
        Ease::OutQuart,
        Ease::InOutQuart,
        Ease::InQuint,
        Ease::OutQuint,
        Ease::InOutQuint,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
        Ease::InExpo,
        Ease::OutExpo,
        Ease::InOutExpo,
        Ease::InCirc,
        Ease::OutCirc,
        Ease::InOutCirc,
        Ease::InQuadOutCubic,
        Ease::InCubicOutQuad,
        Ease::InSineOutExpo,
        Ease::InExpoOutSine,
    ];

    /// Catalog name, e.g. `easeInOutSine`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "easeInQuad",
            Self::OutQuad => "easeOutQuad",
            Self::InOutQuad => "easeInOutQuad",
            Self::InCubic => "easeInCubic",
            Self::OutCubic => "easeOutCubic",
            Self::InOutCubic => "easeInOutCubic",
            Self::InQuart => "easeInQuart",
            Self::OutQuart => "easeOutQuart",
            Self::InOutQuart => "easeInOutQuart",
            Self::InQuint => "easeInQuint",
            Self::OutQuint => "easeOutQuint",
            Self::InOutQuint => "easeInOutQuint",
            Self::InSine => "easeInSine",
            Self::OutSine => "easeOutSine",
            Self::InOutSine => "easeInOutSine",
            Self::InExpo => "easeInExpo",
            Self::OutExpo => "easeOutExpo",
            Self::InOutExpo => "easeInOutExpo",
            Self::InCirc => "easeInCirc",
            Self::OutCirc => "easeOutCirc",
            Self::InOutCirc => "easeInOutCirc",
            Self::InQuadOutCubic => "easeInQuadOutCubic",
            Self::InCubicOutQuad => "easeInCubicOutQuad",
            Self::InSineOutExpo => "easeInSineOutExpo",
            Self::InExpoOutSine => "easeInExpoOutSine",
        }
    }

    /// Exact catalog lookup; `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(5) / 2.0)
                }
            }
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::OutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Self::InQuadOutCubic => hybrid(Self::InQuad, Self::OutCubic, t),
            Self::InCubicOutQuad => hybrid(Self::InCubic, Self::OutQuad, t),
            Self::InSineOutExpo => hybrid(Self::InSine, Self::OutExpo, t),
            Self::InExpoOutSine => hybrid(Self::InExpo, Self::OutSine, t),
        }
    }

    /// `true` for presets whose name marks them as symmetric-at-midpoint (`InOut` and hybrids).
    pub fn is_in_out(self) -> bool {
        self.name().starts_with("easeInOut")
            || matches!(
                self,
                Self::InQuadOutCubic
                    | Self::InCubicOutQuad
                    | Self::InSineOutExpo
                    | Self::InExpoOutSine
            )
    }
}

/// Ease the first half with `first`, the second half with `second`, meeting at `(0.5, 0.5)`.
fn hybrid(first: Ease, second: Ease, t: f64) -> f64 {
    if t < 0.5 {
        first.apply(2.0 * t) / 2.0
    } else {
        0.5 + second.apply(2.0 * t - 1.0) / 2.0
    }
}

static UNKNOWN_NAMES: LazyLock<WarnOnce<String>> = LazyLock::new(WarnOnce::new);

/// Look up a preset by name, falling back to [`Ease::Linear`] for unknown names.
///
/// The fallback is unconditional; the warning for a given unknown name is logged once per
/// process.
pub fn resolve_preset(name: &str) -> Ease {
    if let Some(ease) = Ease::from_name(name) {
        return ease;
    }
    if UNKNOWN_NAMES.first(name.to_string()) {
        tracing::warn!(easing = name, "unknown easing preset, using linear");
    }
    Ease::Linear
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
