use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WarpError::no_video_track("x")
            .to_string()
            .contains("no video track:")
    );
    assert!(
        WarpError::unsupported_profile("x")
            .to_string()
            .contains("unsupported encoder profile:")
    );
    assert!(
        WarpError::no_frames_emitted("x")
            .to_string()
            .contains("no frames emitted:")
    );
    assert!(
        WarpError::audio_decode("x")
            .to_string()
            .contains("audio decode failed:")
    );
    assert!(
        WarpError::finalize("x")
            .to_string()
            .contains("container finalize failed:")
    );
    assert_eq!(WarpError::NoVideosProvided.to_string(), "no videos provided");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WarpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
