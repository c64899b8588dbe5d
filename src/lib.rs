//! Clipwarp re-times and stitches short video clips.
//!
//! Two jobs sit on top of an injected [`MediaBackend`]:
//!
//! - [`SpeedCurveJob`] maps every frame of one clip through an easing curve
//! - [`StitchJob`] concatenates clips onto one timeline with an optional soundtrack
//!
//! Both negotiate an encode tier, place frames on a constant-rate grid and release every codec
//! handle before returning. [`MemoryBackend`] runs the jobs without real codecs; the
//! `media-ffmpeg` feature adds an ffmpeg/ffprobe backed one.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod audio;
pub(crate) mod cli_stitch;
pub(crate) mod encode;
pub(crate) mod jobs;
pub(crate) mod media;
pub(crate) mod pipeline;
pub(crate) mod warp;

pub use crate::foundation::core::{Dimensions, Fps, FrameIndex, Rotation};
pub use crate::foundation::error::{WarpError, WarpResult};
pub use crate::foundation::progress::{ProgressEvent, ProgressObserver, ProgressStatus};

pub use crate::animation::bezier::CubicBezier;
pub use crate::animation::ease::{Ease, resolve_preset};
pub use crate::animation::easing::{CustomEasing, Easing, EasingKey};
pub use crate::warp::lut::{closed_form_time_remap, compute_easing_lut, easing_lut};
pub use crate::warp::mapper::{
    CurveAnalysis, EasingRef, SpeedSample, TimeWarp, WarpValidation, analyze_warp_curve,
    calculate_warped_duration, inverse_progress, is_monotonic, validate_warp_function, warp_time,
};

pub use crate::media::backend::{
    AudioCapabilityQuery, AudioCodec, AudioEncodeConfig, CapabilityProvider, CodecProfile,
    MediaBackend, OutputContainer, OutputSpec, SampleSource, VideoCapabilityQuery, VideoCodec,
    VideoEncodeConfig, VideoTrackInfo,
};
#[cfg(feature = "media-ffmpeg")]
pub use crate::media::ffmpeg::{FfmpegBackend, FfmpegBackendOpts};
pub use crate::media::memory::{
    BackendEvent, CapabilityPolicy, MemoryBackend, RecordedAudio, RecordedFrame, Recording,
    SyntheticClip,
};
pub use crate::media::process::is_tool_available;
pub use crate::media::sample::{AudioPcm, MediaSample, SamplePayload, VideoFrame};

pub use crate::encode::tier::{
    BITRATE_CAP_720P, BITRATE_CAP_1080P, EncodeTier, fit_within, negotiate, speed_curve_tiers,
    stitch_tiers,
};
pub use crate::pipeline::retime::GridRetimer;
pub use crate::pipeline::teardown::{SourceId, Teardown};

pub use crate::audio::decode::{AudioDecoder, FfmpegAudioDecoder, WavDecoder};
pub use crate::audio::prepare::{
    AudioPrepOpts, AudioTrackData, apply_fades, apply_offset, loop_to_duration, prepare_audio,
    prepare_audio_with,
};

pub use crate::jobs::speed_curve::{SpeedCurveJob, SpeedCurveOpts};
pub use crate::jobs::stitch::{StitchJob, StitchOpts};
pub use crate::jobs::{JobOutput, JobStats};

pub use crate::cli_stitch::concat::{ConcatCliOpts, build_concat_list, concat_with_ffmpeg};
pub use crate::cli_stitch::ramp::{
    RampMethod, RampCliOpts, build_frame_list, speed_ramp_with_ffmpeg,
};
