//! Deterministic in-process backend for tests, dry runs and debugging.
//!
//! Inputs are [`SyntheticClip`] descriptions serialized to bytes; outputs are JSON
//! [`Recording`]s of exactly what the job pushed into the container. Every handle lifecycle
//! transition is appended to a shared event log so callers can assert cleanup behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::foundation::core::{Dimensions, FrameIndex, Rotation};
use crate::foundation::error::{WarpError, WarpResult};
use crate::media::backend::{
    AudioCapabilityQuery, AudioCodec, CapabilityProvider, MediaBackend, OutputContainer,
    OutputSpec, SampleSource, VideoCapabilityQuery, VideoCodec, VideoEncodeConfig,
    VideoTrackInfo,
};
use crate::media::sample::{MediaSample, SamplePayload, VideoFrame};

const SYNTH_MAGIC: &[u8] = b"CLIPWARP-SYNTH\n";

/// Description of a fake input clip.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SyntheticClip {
    /// `None` simulates a failed dimension probe.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: f64,
    pub frame_count: u32,
    #[serde(default)]
    pub rotation: u16,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default = "default_true")]
    pub has_video: bool,
    /// Timestamp of the first frame; real demuxers often start slightly after zero.
    #[serde(default)]
    pub start_time: f64,
    /// Override for the track duration (defaults to `frame_count / fps`).
    #[serde(default)]
    pub track_duration: Option<f64>,
    #[serde(default)]
    pub container_duration: Option<f64>,
    /// Fail decoding when this many frames have been delivered.
    #[serde(default)]
    pub fail_after: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl SyntheticClip {
    pub fn new(width: u32, height: u32, fps: f64, frame_count: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            fps,
            frame_count,
            rotation: 0,
            bitrate: None,
            has_video: true,
            start_time: 0.0,
            track_duration: None,
            container_duration: None,
            fail_after: None,
        }
    }

    /// A clip with no video track at all.
    pub fn audio_only() -> Self {
        Self {
            has_video: false,
            ..Self::new(0, 0, 30.0, 0)
        }
    }

    pub fn with_rotation(mut self, degrees: u16) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn without_dimensions(mut self) -> Self {
        self.width = None;
        self.height = None;
        self
    }

    pub fn failing_after(mut self, frames: u32) -> Self {
        self.fail_after = Some(frames);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = SYNTH_MAGIC.to_vec();
        // Serializing plain numbers and options cannot fail.
        out.extend(serde_json::to_vec(self).unwrap_or_default());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> WarpResult<Self> {
        let body = bytes
            .strip_prefix(SYNTH_MAGIC)
            .ok_or_else(|| WarpError::media("input is not a synthetic clip"))?;
        serde_json::from_slice(body)
            .map_err(|e| WarpError::media(format!("synthetic clip parse failed: {e}")))
    }

    fn track_info(&self) -> Option<VideoTrackInfo> {
        if !self.has_video {
            return None;
        }
        let dimensions = match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Dimensions::new(w, h)),
            _ => None,
        };
        let natural = if self.fps > 0.0 {
            Some(f64::from(self.frame_count) / self.fps)
        } else {
            None
        };
        Some(VideoTrackInfo {
            dimensions,
            rotation: Rotation::from_degrees(i64::from(self.rotation)),
            track_duration: self.track_duration.or(natural),
            container_duration: self.container_duration,
            avg_fps: (self.fps > 0.0).then_some(self.fps),
            avg_bitrate: self.bitrate,
        })
    }
}

/// Lifecycle events recorded by [`MemoryBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendEvent {
    /// Input `n` (0-based open order) was opened.
    InputOpened(usize),
    InputDisposed(usize),
    OutputStarted,
    VideoClosed,
    AudioClosed,
    OutputFinalized,
    OutputCancelled,
}

/// Scripted answers for the capability probe and failure injection for outputs.
#[derive(Clone, Debug)]
pub struct CapabilityPolicy {
    /// Reject this many video capability queries before accepting any.
    pub reject_first: usize,
    /// Reject configurations above this many pixels.
    pub max_pixels: Option<u64>,
    /// Audio codecs the host "has".
    pub audio_codecs: Vec<AudioCodec>,
    pub fail_close_video: bool,
    pub fail_finalize: bool,
}

impl Default for CapabilityPolicy {
    fn default() -> Self {
        Self {
            reject_first: 0,
            max_pixels: None,
            audio_codecs: AudioCodec::PREFERENCE.to_vec(),
            fail_close_video: false,
            fail_finalize: false,
        }
    }
}

/// In-memory [`MediaBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    policy: CapabilityPolicy,
    events: Arc<Mutex<Vec<BackendEvent>>>,
    queries: Mutex<Vec<VideoCapabilityQuery>>,
    opened: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CapabilityPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Snapshot of the lifecycle log.
    pub fn events(&self) -> Vec<BackendEvent> {
        lock(&self.events).clone()
    }

    /// Every video capability query received so far, in order.
    pub fn video_queries(&self) -> Vec<VideoCapabilityQuery> {
        lock(&self.queries).clone()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn log(events: &Arc<Mutex<Vec<BackendEvent>>>, ev: BackendEvent) {
    lock(events).push(ev);
}

impl CapabilityProvider for MemoryBackend {
    fn can_encode(&self, _codec: VideoCodec, query: &VideoCapabilityQuery) -> bool {
        let mut queries = lock(&self.queries);
        queries.push(*query);
        if queries.len() <= self.policy.reject_first {
            return false;
        }
        match self.policy.max_pixels {
            Some(max) => u64::from(query.width) * u64::from(query.height) <= max,
            None => true,
        }
    }

    fn best_audio_codec(
        &self,
        preferences: &[AudioCodec],
        _query: &AudioCapabilityQuery,
    ) -> Option<AudioCodec> {
        preferences
            .iter()
            .copied()
            .find(|c| self.policy.audio_codecs.contains(c))
    }
}

impl MediaBackend for MemoryBackend {
    fn open_input(&self, bytes: &[u8]) -> WarpResult<Box<dyn SampleSource>> {
        let clip = SyntheticClip::from_bytes(bytes)?;
        let id = self.opened.fetch_add(1, Ordering::Relaxed);
        log(&self.events, BackendEvent::InputOpened(id));
        Ok(Box::new(MemorySource {
            id,
            info: clip.track_info(),
            clip,
            next: 0,
            disposed: false,
            events: Arc::clone(&self.events),
        }))
    }

    fn create_output(&self, spec: OutputSpec) -> WarpResult<Box<dyn OutputContainer>> {
        Ok(Box::new(MemoryContainer {
            spec,
            fail_close_video: self.policy.fail_close_video,
            fail_finalize: self.policy.fail_finalize,
            state: ContainerState::Created,
            frames: Vec::new(),
            audio: None,
            events: Arc::clone(&self.events),
        }))
    }
}

struct MemorySource {
    id: usize,
    clip: SyntheticClip,
    info: Option<VideoTrackInfo>,
    next: u32,
    disposed: bool,
    events: Arc<Mutex<Vec<BackendEvent>>>,
}

impl SampleSource for MemorySource {
    fn video_track(&self) -> Option<&VideoTrackInfo> {
        self.info.as_ref()
    }

    fn next_video_sample(&mut self) -> WarpResult<Option<MediaSample>> {
        if self.disposed {
            return Err(WarpError::media("decoder used after dispose"));
        }
        if self.info.is_none() || self.next >= self.clip.frame_count {
            return Ok(None);
        }
        if self.clip.fail_after == Some(self.next) {
            return Err(WarpError::media(format!(
                "synthetic decode failure at frame {}",
                self.next
            )));
        }
        let idx = self.next;
        self.next += 1;
        let frame_dur = 1.0 / self.clip.fps;
        let frame = VideoFrame {
            width: self.clip.width.unwrap_or(0),
            height: self.clip.height.unwrap_or(0),
            data: idx.to_le_bytes().to_vec(),
        };
        Ok(Some(MediaSample::video(
            self.clip.start_time + f64::from(idx) * frame_dur,
            frame_dur,
            frame,
        )))
    }

    fn dispose(&mut self) -> WarpResult<()> {
        if !self.disposed {
            self.disposed = true;
            log(&self.events, BackendEvent::InputDisposed(self.id));
        }
        Ok(())
    }
}

/// One encoded frame in a [`Recording`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordedFrame {
    pub slot: u64,
    pub timestamp: f64,
    pub duration: f64,
    /// Index of the source frame within its clip, when the payload carried one.
    pub source_index: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecordedAudio {
    pub codec: AudioCodec,
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: usize,
    pub duration: f64,
}

/// Output produced by [`MemoryBackend`] containers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Recording {
    pub video: VideoEncodeConfig,
    pub rotation: Rotation,
    pub frames: Vec<RecordedFrame>,
    pub audio: Option<RecordedAudio>,
}

impl Recording {
    pub fn from_bytes(bytes: &[u8]) -> WarpResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| WarpError::media(format!("recording parse failed: {e}")))
    }

    /// End time of the last encoded frame.
    pub fn video_duration(&self) -> f64 {
        self.frames
            .last()
            .map(|f| f.timestamp + f.duration)
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContainerState {
    Created,
    Started,
    Finalized,
    Cancelled,
}

struct MemoryContainer {
    spec: OutputSpec,
    fail_close_video: bool,
    fail_finalize: bool,
    state: ContainerState,
    frames: Vec<RecordedFrame>,
    audio: Option<RecordedAudio>,
    events: Arc<Mutex<Vec<BackendEvent>>>,
}

impl MemoryContainer {
    fn require_started(&self) -> WarpResult<()> {
        if self.state != ContainerState::Started {
            return Err(WarpError::media(format!(
                "container is {:?}, expected Started",
                self.state
            )));
        }
        Ok(())
    }
}

impl OutputContainer for MemoryContainer {
    fn start(&mut self) -> WarpResult<()> {
        if self.state != ContainerState::Created {
            return Err(WarpError::media("container already started"));
        }
        self.state = ContainerState::Started;
        log(&self.events, BackendEvent::OutputStarted);
        Ok(())
    }

    fn push_video(&mut self, slot: FrameIndex, sample: MediaSample) -> WarpResult<()> {
        self.require_started()?;
        if let Some(last) = self.frames.last()
            && slot.0 <= last.slot
        {
            return Err(WarpError::media(
                "container received out-of-order frame slot",
            ));
        }
        let source_index = match &sample.payload {
            SamplePayload::Video(f) if f.data.len() == 4 => Some(u32::from_le_bytes([
                f.data[0], f.data[1], f.data[2], f.data[3],
            ])),
            _ => None,
        };
        self.frames.push(RecordedFrame {
            slot: slot.0,
            timestamp: sample.timestamp,
            duration: sample.duration,
            source_index,
        });
        Ok(())
    }

    fn close_video(&mut self) -> WarpResult<()> {
        log(&self.events, BackendEvent::VideoClosed);
        if self.fail_close_video {
            return Err(WarpError::media("synthetic video encoder flush failure"));
        }
        Ok(())
    }

    fn write_audio(&mut self, sample: MediaSample) -> WarpResult<()> {
        self.require_started()?;
        let Some(cfg) = self.spec.audio else {
            return Err(WarpError::media("container has no audio track"));
        };
        let SamplePayload::Audio(pcm) = sample.payload else {
            return Err(WarpError::media("write_audio expects an audio sample"));
        };
        let rec = self.audio.get_or_insert(RecordedAudio {
            codec: cfg.codec,
            sample_rate: pcm.sample_rate,
            channels: pcm.channels,
            frames: 0,
            duration: 0.0,
        });
        rec.frames += pcm.frames();
        rec.duration = rec.frames as f64 / f64::from(rec.sample_rate.max(1));
        Ok(())
    }

    fn close_audio(&mut self) -> WarpResult<()> {
        log(&self.events, BackendEvent::AudioClosed);
        Ok(())
    }

    fn finalize(&mut self) -> WarpResult<Vec<u8>> {
        self.require_started()?;
        if self.fail_finalize {
            return Err(WarpError::finalize("synthetic finalize failure"));
        }
        let recording = Recording {
            video: self.spec.video,
            rotation: self.spec.rotation,
            frames: std::mem::take(&mut self.frames),
            audio: self.audio.take(),
        };
        let bytes = serde_json::to_vec(&recording)
            .map_err(|e| WarpError::finalize(format!("recording serialize failed: {e}")))?;
        self.state = ContainerState::Finalized;
        log(&self.events, BackendEvent::OutputFinalized);
        Ok(bytes)
    }

    fn cancel(&mut self) -> WarpResult<()> {
        if self.state == ContainerState::Started {
            self.state = ContainerState::Cancelled;
            log(&self.events, BackendEvent::OutputCancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/memory.rs"]
mod tests;
