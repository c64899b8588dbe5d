/// Convenience result type used across clipwarp.
pub type WarpResult<T> = Result<T, WarpError>;

/// Top-level error taxonomy returned by job entry points.
///
/// Every variant is fatal for the job that produced it. Recoverable conditions (dimension probe
/// fallback, rotation mismatch, missing audio codec, skipped clip, non-monotonic easing) are
/// logged and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum WarpError {
    /// The input contains no decodable video track.
    #[error("no video track: {0}")]
    NoVideoTrack(String),

    /// Every encoder tier was rejected by the capability provider.
    #[error("unsupported encoder profile: {0}")]
    UnsupportedProfile(String),

    /// Decoding finished without a single sample reaching the encoder.
    #[error("no frames emitted: {0}")]
    NoFramesEmitted(String),

    /// A stitch job was invoked with an empty clip list.
    #[error("no videos provided")]
    NoVideosProvided,

    /// Both the primary and the fallback audio decode paths failed.
    #[error("audio decode failed: {0}")]
    AudioDecodeFailed(String),

    /// The output container could not be finalized into bytes.
    #[error("container finalize failed: {0}")]
    ContainerFinalizeFailed(String),

    /// Invalid caller-provided options or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Decode/encode I/O failure inside a media backend.
    #[error("media error: {0}")]
    Media(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WarpError {
    /// Build a [`WarpError::NoVideoTrack`] value.
    pub fn no_video_track(msg: impl Into<String>) -> Self {
        Self::NoVideoTrack(msg.into())
    }

    /// Build a [`WarpError::UnsupportedProfile`] value.
    pub fn unsupported_profile(msg: impl Into<String>) -> Self {
        Self::UnsupportedProfile(msg.into())
    }

    /// Build a [`WarpError::NoFramesEmitted`] value.
    pub fn no_frames_emitted(msg: impl Into<String>) -> Self {
        Self::NoFramesEmitted(msg.into())
    }

    /// Build a [`WarpError::AudioDecodeFailed`] value.
    pub fn audio_decode(msg: impl Into<String>) -> Self {
        Self::AudioDecodeFailed(msg.into())
    }

    /// Build a [`WarpError::ContainerFinalizeFailed`] value.
    pub fn finalize(msg: impl Into<String>) -> Self {
        Self::ContainerFinalizeFailed(msg.into())
    }

    /// Build a [`WarpError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WarpError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
