use crate::foundation::error::{WarpError, WarpResult};

/// Index of one slot on a fixed output frame-rate grid.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> WarpResult<Self> {
        if den == 0 {
            return Err(WarpError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(WarpError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Approximate a probed floating-point rate (e.g. `29.97`) as a rational.
    ///
    /// Integral rates map to `n/1`; NTSC-style rates map to `n*1000/1001`; anything else is
    /// rounded to the nearest whole rate.
    pub fn from_f64(rate: f64) -> WarpResult<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(WarpError::validation(format!(
                "frame rate must be finite and > 0, got {rate}"
            )));
        }
        let whole = rate.round();
        if (rate - whole).abs() < 1e-3 {
            return Self::new(whole as u32, 1);
        }
        let ntsc = (rate * 1001.0 / 1000.0).round();
        if (ntsc * 1000.0 / 1001.0 - rate).abs() < 1e-2 {
            return Self::new(ntsc as u32 * 1000, 1001);
        }
        Self::new(whole.max(1.0) as u32, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Nearest grid slot for `secs` (negative times snap to slot 0).
    pub fn secs_to_nearest_frame(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Pixel dimensions of a video track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Used when a source refuses to report its size.
    pub const FALLBACK: Self = Self {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }

    pub fn long_side(self) -> u32 {
        self.width.max(self.height)
    }

    pub fn short_side(self) -> u32 {
        self.width.min(self.height)
    }

    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Display rotation carried in container metadata, in degrees clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rotation(pub u16);

impl Rotation {
    /// Normalize any (possibly negative) degree value onto `0/90/180/270`.
    pub fn from_degrees(deg: i64) -> Self {
        let norm = deg.rem_euclid(360);
        let snapped = ((norm + 45) / 90 * 90) % 360;
        Self(snapped as u16)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
