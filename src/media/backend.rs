use crate::foundation::core::{Dimensions, FrameIndex, Fps, Rotation};
use crate::foundation::error::WarpResult;
use crate::media::sample::MediaSample;

/// The single video codec family this crate encodes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 / AVC in an MP4 container.
    Avc,
}

impl VideoCodec {
    pub fn label(self) -> &'static str {
        match self {
            Self::Avc => "avc",
        }
    }
}

/// H.264 profile requested from the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecProfile {
    Baseline,
    Main,
    High,
}

impl CodecProfile {
    pub fn label(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Main => "main",
            Self::High => "high",
        }
    }
}

/// Audio codecs, in the order callers usually prefer them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Opus,
    Mp3,
}

impl AudioCodec {
    /// Default preference list used by stitch jobs.
    pub const PREFERENCE: [AudioCodec; 3] = [AudioCodec::Aac, AudioCodec::Opus, AudioCodec::Mp3];

    pub fn label(self) -> &'static str {
        match self {
            Self::Aac => "aac",
            Self::Opus => "opus",
            Self::Mp3 => "mp3",
        }
    }
}

/// Exact configuration a capability provider is asked about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoCapabilityQuery {
    pub width: u32,
    pub height: u32,
    pub bitrate: u64,
    pub profile: Option<CodecProfile>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioCapabilityQuery {
    pub channels: u16,
    pub sample_rate: u32,
    pub bitrate: u64,
}

/// Host encode-capability probe.
pub trait CapabilityProvider {
    /// Whether the host can encode `codec` with exactly this configuration.
    fn can_encode(&self, codec: VideoCodec, query: &VideoCapabilityQuery) -> bool;

    /// First codec from `preferences` the host can encode with `query`, if any.
    fn best_audio_codec(
        &self,
        preferences: &[AudioCodec],
        query: &AudioCapabilityQuery,
    ) -> Option<AudioCodec>;
}

/// Metadata of the first video track of an input.
///
/// Every field is optional because real-world probes routinely omit some of them; jobs apply
/// documented fallbacks.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoTrackInfo {
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub rotation: Rotation,
    /// Duration computed from the track's own samples.
    pub track_duration: Option<f64>,
    /// Duration reported by the container header.
    pub container_duration: Option<f64>,
    pub avg_fps: Option<f64>,
    /// Average bitrate in bits per second.
    pub avg_bitrate: Option<u64>,
}

/// Decoder handle for one input blob.
pub trait SampleSource: Send {
    /// `None` when the input has no decodable video track.
    fn video_track(&self) -> Option<&VideoTrackInfo>;

    /// Ask the decoder to deliver frames at `size` (letterboxed). Must be called before the
    /// first sample is read; backends that do not touch pixels may ignore it.
    fn configure_output(&mut self, _size: Dimensions) -> WarpResult<()> {
        Ok(())
    }

    /// Next decoded video sample in presentation order, `None` at end of stream.
    fn next_video_sample(&mut self) -> WarpResult<Option<MediaSample>>;

    /// Release decoder resources. Must be idempotent.
    fn dispose(&mut self) -> WarpResult<()>;
}

/// Negotiated video encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VideoEncodeConfig {
    pub codec: VideoCodec,
    pub dimensions: Dimensions,
    pub bitrate: u64,
    pub profile: CodecProfile,
    pub fps: Fps,
}

/// Negotiated audio encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AudioEncodeConfig {
    pub codec: AudioCodec,
    pub channels: u16,
    pub sample_rate: u32,
    pub bitrate: u64,
}

/// Track layout of an output container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputSpec {
    pub video: VideoEncodeConfig,
    pub audio: Option<AudioEncodeConfig>,
    pub rotation: Rotation,
}

/// Encoder + multiplexer for one output blob.
///
/// Call order: `start`, any number of `push_video` with strictly increasing slots, `close_video`,
/// optionally `write_audio`/`close_audio`, then `finalize`. `cancel` aborts a started container
/// that will never be finalized.
pub trait OutputContainer: Send {
    fn start(&mut self) -> WarpResult<()>;

    /// Encode `sample` at output grid slot `slot`.
    fn push_video(&mut self, slot: FrameIndex, sample: MediaSample) -> WarpResult<()>;

    /// Flush and close the video encoder input.
    fn close_video(&mut self) -> WarpResult<()>;

    fn write_audio(&mut self, sample: MediaSample) -> WarpResult<()>;

    fn close_audio(&mut self) -> WarpResult<()>;

    /// Finish the container and return its bytes.
    fn finalize(&mut self) -> WarpResult<Vec<u8>>;

    fn cancel(&mut self) -> WarpResult<()>;
}

/// Factory for decoders and output containers, plus the host capability probe.
pub trait MediaBackend: CapabilityProvider + Sync {
    fn open_input(&self, bytes: &[u8]) -> WarpResult<Box<dyn SampleSource>>;

    fn create_output(&self, spec: OutputSpec) -> WarpResult<Box<dyn OutputContainer>>;
}
