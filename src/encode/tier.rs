use crate::foundation::core::Dimensions;
use crate::foundation::error::{WarpError, WarpResult};
use crate::media::backend::{CapabilityProvider, CodecProfile, VideoCapabilityQuery, VideoCodec};

/// Bitrate ceiling of the 1080p-capped speed-curve tier.
pub const BITRATE_CAP_1080P: u64 = 10_000_000;
/// Bitrate ceiling of the 720p-capped speed-curve tier.
pub const BITRATE_CAP_720P: u64 = 5_000_000;

/// Standard sizes offered to stitch outputs, landscape orientation.
const STITCH_ALLOW_LIST: [(&str, u32, u32); 2] = [("1080p", 1920, 1080), ("720p", 1280, 720)];

/// One candidate encoder configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EncodeTier {
    pub name: &'static str,
    pub dimensions: Dimensions,
    pub bitrate: u64,
    pub profile: CodecProfile,
}

impl EncodeTier {
    pub fn query(&self) -> VideoCapabilityQuery {
        VideoCapabilityQuery {
            width: self.dimensions.width,
            height: self.dimensions.height,
            bitrate: self.bitrate,
            profile: Some(self.profile),
        }
    }
}

fn even_floor(v: u32) -> u32 {
    (v & !1).max(2)
}

/// Scale `source` down (never up) so its long side fits `long_max` and its short side fits
/// `short_max`, keeping the aspect ratio and flooring each side to an even value.
pub fn fit_within(source: Dimensions, long_max: u32, short_max: u32) -> Dimensions {
    let long = f64::from(source.long_side().max(1));
    let short = f64::from(source.short_side().max(1));
    let scale = (f64::from(long_max) / long)
        .min(f64::from(short_max) / short)
        .min(1.0);
    Dimensions::new(
        even_floor((f64::from(source.width) * scale).round() as u32),
        even_floor((f64::from(source.height) * scale).round() as u32),
    )
}

/// Original, 1080p-capped, 720p-capped; each aspect-preserving.
pub fn speed_curve_tiers(source: Dimensions, bitrate: u64) -> Vec<EncodeTier> {
    vec![
        EncodeTier {
            name: "original",
            dimensions: Dimensions::new(even_floor(source.width), even_floor(source.height)),
            bitrate,
            profile: CodecProfile::High,
        },
        EncodeTier {
            name: "1080p",
            dimensions: fit_within(source, 1920, 1080),
            bitrate: bitrate.min(BITRATE_CAP_1080P),
            profile: CodecProfile::Main,
        },
        EncodeTier {
            name: "720p",
            dimensions: fit_within(source, 1280, 720),
            bitrate: bitrate.min(BITRATE_CAP_720P),
            profile: CodecProfile::Main,
        },
    ]
}

/// Fixed standard-resolution tiers for multi-clip output. Portrait inputs get the swapped sizes.
pub fn stitch_tiers(max_source: Dimensions, bitrate: u64, bitrate_cap: u64) -> Vec<EncodeTier> {
    let portrait = max_source.is_portrait();
    STITCH_ALLOW_LIST
        .iter()
        .map(|&(name, w, h)| EncodeTier {
            name,
            dimensions: if portrait {
                Dimensions::new(h, w)
            } else {
                Dimensions::new(w, h)
            },
            bitrate: bitrate.min(bitrate_cap),
            profile: CodecProfile::Main,
        })
        .collect()
}

/// Return the first tier `provider` accepts. Tiers after the accepted one are never queried.
pub fn negotiate(
    provider: &dyn CapabilityProvider,
    tiers: &[EncodeTier],
) -> WarpResult<EncodeTier> {
    for tier in tiers {
        if provider.can_encode(VideoCodec::Avc, &tier.query()) {
            tracing::debug!(
                tier = tier.name,
                width = tier.dimensions.width,
                height = tier.dimensions.height,
                bitrate = tier.bitrate,
                "encoder tier accepted"
            );
            return Ok(*tier);
        }
        tracing::debug!(
            tier = tier.name,
            width = tier.dimensions.width,
            height = tier.dimensions.height,
            bitrate = tier.bitrate,
            profile = tier.profile.label(),
            "encoder tier rejected"
        );
    }
    let tried = tiers
        .iter()
        .map(|t| {
            format!(
                "{} {}x{} @ {} bps ({})",
                t.name,
                t.dimensions.width,
                t.dimensions.height,
                t.bitrate,
                t.profile.label()
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    Err(WarpError::unsupported_profile(format!(
        "no encoder configuration is supported on this system (tried: {tried}); \
         reduce the video resolution or bitrate, or use different software"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/tier.rs"]
mod tests;
