use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::animation::bezier::CubicBezier;
use crate::animation::ease::{Ease, resolve_preset};
use crate::foundation::error::{WarpError, WarpResult};

static NEXT_CUSTOM_ID: AtomicU64 = AtomicU64::new(1);

/// Caller-supplied easing function.
///
/// Each call to [`CustomEasing::new`] creates a distinct instance; clones share the instance id,
/// which is what once-per-instance diagnostics key on.
#[derive(Clone)]
pub struct CustomEasing {
    id: u64,
    label: String,
    f: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl CustomEasing {
    pub fn new(label: impl Into<String>, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            id: NEXT_CUSTOM_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            f: Arc::new(f),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for CustomEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEasing")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish()
    }
}

/// Identity of one easing instance, used to deduplicate diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EasingKey {
    Preset(Ease),
    Bezier([u64; 4]),
    Custom(u64),
}

/// Any easing usable by the time-warp mapper and the jobs.
#[derive(Clone, Debug)]
pub enum Easing {
    /// Closed-form catalog entry.
    Preset(Ease),
    /// Cubic bezier evaluated numerically.
    Bezier(CubicBezier),
    /// Arbitrary caller function; may violate the easing contract.
    Custom(CustomEasing),
}

impl Easing {
    /// Wrap a caller function as an easing.
    pub fn custom(label: impl Into<String>, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(CustomEasing::new(label, f))
    }

    /// Build a clamped cubic-bezier easing.
    pub fn bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::Bezier(CubicBezier::new(x1, y1, x2, y2))
    }

    /// Parse a preset name, a CSS keyword, or `cubic-bezier(x1, y1, x2, y2)`.
    ///
    /// Unknown preset names resolve to linear (see [`resolve_preset`]); only a malformed
    /// `cubic-bezier(...)` is an error.
    pub fn parse(s: &str) -> WarpResult<Self> {
        let s = s.trim();
        if let Some(args) = s
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let nums = args
                .split(',')
                .map(|p| p.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| WarpError::validation(format!("invalid cubic-bezier '{s}': {e}")))?;
            let [x1, y1, x2, y2] = nums.as_slice() else {
                return Err(WarpError::validation(format!(
                    "cubic-bezier '{s}' needs exactly four numbers"
                )));
            };
            return Ok(Self::bezier(*x1, *y1, *x2, *y2));
        }
        Ok(match s {
            "ease" => Self::Bezier(CubicBezier::css_ease()),
            "ease-in" => Self::Bezier(CubicBezier::css_ease_in()),
            "ease-out" => Self::Bezier(CubicBezier::css_ease_out()),
            "ease-in-out" => Self::Bezier(CubicBezier::css_ease_in_out()),
            name => Self::Preset(resolve_preset(name)),
        })
    }

    /// Evaluate at normalized progress `t`; the input is clamped to `[0, 1]`.
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Preset(e) => e.apply(t),
            Self::Bezier(b) => b.apply(t),
            Self::Custom(c) => (c.f)(t),
        }
    }

    pub fn key(&self) -> EasingKey {
        match self {
            Self::Preset(e) => EasingKey::Preset(*e),
            Self::Bezier(b) => {
                EasingKey::Bezier([b.x1.to_bits(), b.y1.to_bits(), b.x2.to_bits(), b.y2.to_bits()])
            }
            Self::Custom(c) => EasingKey::Custom(c.id),
        }
    }

    /// Closed-form preset behind this easing, if any.
    pub fn as_preset(&self) -> Option<Ease> {
        match self {
            Self::Preset(e) => Some(*e),
            _ => None,
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::Preset(Ease::InOutSine)
    }
}

impl From<Ease> for Easing {
    fn from(e: Ease) -> Self {
        Self::Preset(e)
    }
}

impl From<CubicBezier> for Easing {
    fn from(b: CubicBezier) -> Self {
        Self::Bezier(b)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(e) => f.write_str(e.name()),
            Self::Bezier(b) => write!(f, "cubic-bezier({}, {}, {}, {})", b.x1, b.y1, b.x2, b.y2),
            Self::Custom(c) => write!(f, "custom:{}", c.label),
        }
    }
}

impl serde::Serialize for Easing {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Self::Custom(c) = self {
            return Err(serde::ser::Error::custom(format!(
                "custom easing '{}' cannot be serialized",
                c.label
            )));
        }
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Easing {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/easing.rs"]
mod tests;
