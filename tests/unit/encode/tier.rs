use super::*;
use crate::media::memory::{CapabilityPolicy, MemoryBackend};

#[test]
fn speed_curve_tiers_preserve_aspect_and_even_sizes() {
    let tiers = speed_curve_tiers(Dimensions::new(3840, 2160), 20_000_000);
    let names: Vec<_> = tiers.iter().map(|t| t.name).collect();
    assert_eq!(names, ["original", "1080p", "720p"]);
    assert_eq!(tiers[0].dimensions, Dimensions::new(3840, 2160));
    assert_eq!(tiers[0].profile, CodecProfile::High);
    assert_eq!(tiers[1].dimensions, Dimensions::new(1920, 1080));
    assert_eq!(tiers[1].bitrate, BITRATE_CAP_1080P);
    assert_eq!(tiers[2].dimensions, Dimensions::new(1280, 720));
    assert_eq!(tiers[2].bitrate, BITRATE_CAP_720P);
}

#[test]
fn odd_and_portrait_sources_round_to_even() {
    let tiers = speed_curve_tiers(Dimensions::new(1081, 1921), 4_000_000);
    assert_eq!(tiers[0].dimensions, Dimensions::new(1080, 1920));
    for t in &tiers {
        assert_eq!(t.dimensions.width % 2, 0);
        assert_eq!(t.dimensions.height % 2, 0);
        assert!(t.dimensions.is_portrait());
        assert!(t.bitrate <= 4_000_000);
    }
    assert_eq!(tiers[2].dimensions, Dimensions::new(720, 1278));
}

#[test]
fn small_sources_are_never_upscaled() {
    assert_eq!(
        fit_within(Dimensions::new(640, 480), 1920, 1080),
        Dimensions::new(640, 480)
    );
    assert_eq!(
        fit_within(Dimensions::new(1, 1), 1280, 720),
        Dimensions::new(2, 2)
    );
}

#[test]
fn stitch_tiers_come_from_the_allow_list() {
    let landscape = stitch_tiers(Dimensions::new(1000, 500), 20_000_000, 8_000_000);
    assert_eq!(landscape[0].dimensions, Dimensions::new(1920, 1080));
    assert_eq!(landscape[1].dimensions, Dimensions::new(1280, 720));
    assert!(landscape.iter().all(|t| t.bitrate == 8_000_000));

    let portrait = stitch_tiers(Dimensions::new(720, 1280), 2_000_000, 8_000_000);
    assert_eq!(portrait[0].dimensions, Dimensions::new(1080, 1920));
    assert_eq!(portrait[1].dimensions, Dimensions::new(720, 1280));
    assert!(portrait.iter().all(|t| t.bitrate == 2_000_000));
}

#[test]
fn negotiation_stops_at_first_accepted_tier() {
    let backend = MemoryBackend::with_policy(CapabilityPolicy {
        reject_first: 1,
        ..CapabilityPolicy::default()
    });
    let tiers = speed_curve_tiers(Dimensions::new(3840, 2160), 8_000_000);
    let chosen = negotiate(&backend, &tiers).unwrap();
    assert_eq!(chosen, tiers[1]);
    assert_eq!(backend.video_queries(), vec![tiers[0].query(), tiers[1].query()]);
}

#[test]
fn exhausted_cascade_is_unsupported_profile() {
    let backend = MemoryBackend::with_policy(CapabilityPolicy {
        reject_first: usize::MAX,
        ..CapabilityPolicy::default()
    });
    let tiers = stitch_tiers(Dimensions::new(1920, 1080), 8_000_000, 8_000_000);
    let err = negotiate(&backend, &tiers).unwrap_err();
    assert!(matches!(err, WarpError::UnsupportedProfile(_)));
    assert!(err.to_string().contains("reduce the video resolution or bitrate"));
    assert_eq!(backend.video_queries().len(), 2);
}
