//! [`MediaBackend`] driving the system `ffprobe`/`ffmpeg` binaries.
//!
//! Inputs are spooled to temp files and probed once. Decoding is lazy: the first
//! `next_video_sample` call spawns an `ffmpeg` that streams RGBA frames over stdout. Outputs
//! encode raw RGBA from stdin into a temporary H.264 track; `finalize` muxes the optional audio
//! spool and rotation metadata in a final stream-copy pass and returns the MP4 bytes.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::OnceLock;

use anyhow::Context as _;
use tempfile::{NamedTempFile, TempDir};

use crate::foundation::core::{Dimensions, FrameIndex, Rotation};
use crate::foundation::error::{WarpError, WarpResult};
use crate::media::backend::{
    AudioCapabilityQuery, AudioCodec, CapabilityProvider, CodecProfile, MediaBackend,
    OutputContainer, OutputSpec, SampleSource, VideoCapabilityQuery, VideoCodec, VideoTrackInfo,
};
use crate::media::process::{
    StderrDrain, is_tool_available, kill_quietly, parse_rate, run_checked, wait_checked,
};
use crate::media::sample::{MediaSample, SamplePayload, VideoFrame};

const AVC_ENCODER: &str = "libx264";

// H.264 level 5.1 limits.
const H264_MAX_FRAME_MBS: u64 = 36_864;
const H264_MAX_SIDE: u32 = 8_688;
const H264_MAX_BITRATE_MAIN: u64 = 240_000_000;
const H264_MAX_BITRATE_HIGH: u64 = 300_000_000;

/// Tool locations and encoder tuning for [`FfmpegBackend`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FfmpegBackendOpts {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// x264 speed preset.
    pub preset: String,
}

impl Default for FfmpegBackendOpts {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            preset: "veryfast".to_owned(),
        }
    }
}

pub struct FfmpegBackend {
    opts: FfmpegBackendOpts,
    encoders: OnceLock<HashSet<String>>,
}

impl FfmpegBackend {
    pub fn new(opts: FfmpegBackendOpts) -> Self {
        Self {
            opts,
            encoders: OnceLock::new(),
        }
    }

    /// Whether both `ffmpeg` and `ffprobe` can be invoked.
    pub fn is_available(&self) -> bool {
        is_tool_available(&self.opts.ffmpeg) && is_tool_available(&self.opts.ffprobe)
    }

    fn encoders(&self) -> &HashSet<String> {
        self.encoders.get_or_init(|| {
            let mut cmd = Command::new(&self.opts.ffmpeg);
            cmd.args(["-hide_banner", "-encoders"]);
            match run_checked(&mut cmd, "ffmpeg -encoders") {
                Ok(out) => parse_encoder_list(&String::from_utf8_lossy(&out.stdout)),
                Err(err) => {
                    tracing::warn!(%err, "encoder listing failed; reporting no encoders");
                    HashSet::new()
                }
            }
        })
    }
}

/// Input options that tag the copied video stream with `rotation` (clockwise degrees).
///
/// `-display_rotation` writes the MP4 display matrix and counts counter-clockwise.
pub(crate) fn display_rotation_args(rotation: Rotation) -> Vec<String> {
    if rotation.0 == 0 {
        return Vec::new();
    }
    let ccw = (360 - u32::from(rotation.0)) % 360;
    vec!["-display_rotation".to_owned(), ccw.to_string()]
}

/// Encoder names from `ffmpeg -encoders` output.
pub(crate) fn parse_encoder_list(text: &str) -> HashSet<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|l| {
            let mut it = l.split_whitespace();
            let flags = it.next()?;
            let name = it.next()?;
            (flags.len() == 6).then(|| name.to_owned())
        })
        .collect()
}

pub(crate) fn within_h264_limits(q: &VideoCapabilityQuery) -> bool {
    if q.width == 0 || q.height == 0 || q.width % 2 != 0 || q.height % 2 != 0 {
        return false;
    }
    if q.width > H264_MAX_SIDE || q.height > H264_MAX_SIDE {
        return false;
    }
    let mbs = u64::from(q.width.div_ceil(16)) * u64::from(q.height.div_ceil(16));
    let max_rate = match q.profile {
        Some(CodecProfile::High) => H264_MAX_BITRATE_HIGH,
        _ => H264_MAX_BITRATE_MAIN,
    };
    mbs <= H264_MAX_FRAME_MBS && q.bitrate <= max_rate
}

fn audio_encoder(codec: AudioCodec) -> &'static str {
    match codec {
        AudioCodec::Aac => "aac",
        AudioCodec::Opus => "libopus",
        AudioCodec::Mp3 => "libmp3lame",
    }
}

fn audio_params_supported(codec: AudioCodec, q: &AudioCapabilityQuery) -> bool {
    if q.channels == 0 {
        return false;
    }
    match codec {
        AudioCodec::Aac => q.sample_rate <= 96_000,
        AudioCodec::Opus => matches!(q.sample_rate, 8_000 | 12_000 | 16_000 | 24_000 | 48_000),
        AudioCodec::Mp3 => q.channels <= 2 && q.sample_rate <= 48_000,
    }
}

impl CapabilityProvider for FfmpegBackend {
    fn can_encode(&self, codec: VideoCodec, query: &VideoCapabilityQuery) -> bool {
        match codec {
            VideoCodec::Avc => {
                self.encoders().contains(AVC_ENCODER) && within_h264_limits(query)
            }
        }
    }

    fn best_audio_codec(
        &self,
        preferences: &[AudioCodec],
        query: &AudioCapabilityQuery,
    ) -> Option<AudioCodec> {
        let encoders = self.encoders();
        preferences.iter().copied().find(|&c| {
            encoders.contains(audio_encoder(c)) && audio_params_supported(c, query)
        })
    }
}

impl MediaBackend for FfmpegBackend {
    fn open_input(&self, bytes: &[u8]) -> WarpResult<Box<dyn SampleSource>> {
        let mut input = tempfile::Builder::new()
            .prefix("clipwarp-in-")
            .tempfile()
            .context("failed to create input temp file")?;
        input
            .write_all(bytes)
            .and_then(|_| input.flush())
            .context("failed to spool input to temp file")?;

        let mut probe = Command::new(&self.opts.ffprobe);
        probe
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(input.path());
        let out = run_checked(&mut probe, "ffprobe")?;
        let info = track_info_from_probe(&out.stdout)?;

        let timestamps = match info {
            Some(_) => probe_frame_times(&self.opts.ffprobe, input.path())?,
            None => Vec::new(),
        };
        let frame_dur = info
            .as_ref()
            .and_then(|i| i.avg_fps)
            .map(|fps| 1.0 / fps)
            .unwrap_or(1.0 / 30.0);
        let out_size = info
            .as_ref()
            .and_then(|i| i.dimensions)
            .unwrap_or(Dimensions::FALLBACK);

        tracing::debug!(
            frames = timestamps.len(),
            has_video = info.is_some(),
            "probed input"
        );
        Ok(Box::new(FfmpegSource {
            ffmpeg: self.opts.ffmpeg.clone(),
            input: Some(input),
            info,
            timestamps,
            frame_dur,
            out_size,
            decoder: None,
            next: 0,
            exhausted: false,
        }))
    }

    fn create_output(&self, spec: OutputSpec) -> WarpResult<Box<dyn OutputContainer>> {
        let d = spec.video.dimensions;
        if d.width == 0 || d.height == 0 || d.width % 2 != 0 || d.height % 2 != 0 {
            return Err(WarpError::validation(format!(
                "output size must be even and non-zero, got {}x{}",
                d.width, d.height
            )));
        }
        Ok(Box::new(FfmpegContainer {
            opts: self.opts.clone(),
            spec,
            workdir: None,
            encoder: None,
            last: None,
            audio: None,
            state: State::Created,
        }))
    }
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Video track metadata from `ffprobe -show_streams -show_format` JSON.
pub(crate) fn track_info_from_probe(json: &[u8]) -> WarpResult<Option<VideoTrackInfo>> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| WarpError::media(format!("ffprobe json parse failed: {e}")))?;
    let Some(stream) = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    else {
        return Ok(None);
    };

    let dimensions = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(Dimensions::new(w, h)),
        _ => None,
    };
    // Display-matrix side data is counter-clockwise; the legacy tag is clockwise.
    let rotation = stream
        .side_data_list
        .iter()
        .find_map(|s| s.rotation)
        .map(|r| Rotation::from_degrees(-(r.round() as i64)))
        .or_else(|| {
            stream
                .tags
                .get("rotate")
                .and_then(|r| r.trim().parse::<i64>().ok())
                .map(Rotation::from_degrees)
        })
        .unwrap_or_default();
    let positive = |s: &Option<String>| {
        s.as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    };

    Ok(Some(VideoTrackInfo {
        dimensions,
        rotation,
        track_duration: positive(&stream.duration),
        container_duration: parsed.format.as_ref().and_then(|f| positive(&f.duration)),
        avg_fps: stream
            .avg_frame_rate
            .as_deref()
            .and_then(parse_rate)
            .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate)),
        avg_bitrate: stream
            .bit_rate
            .as_deref()
            .and_then(|b| b.trim().parse::<u64>().ok())
            .filter(|b| *b > 0),
    }))
}

/// Presentation timestamps of every video packet, sorted.
pub(crate) fn parse_packet_times(text: &str) -> Vec<f64> {
    let mut times: Vec<f64> = text
        .lines()
        .filter_map(|l| l.trim().trim_end_matches(',').parse::<f64>().ok())
        .filter(|t| t.is_finite())
        .collect();
    times.sort_by(f64::total_cmp);
    times
}

fn probe_frame_times(ffprobe: &Path, input: &Path) -> WarpResult<Vec<f64>> {
    let mut cmd = Command::new(ffprobe);
    cmd.args([
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-show_entries",
        "packet=pts_time",
        "-of",
        "csv=p=0",
    ])
    .arg(input);
    let out = run_checked(&mut cmd, "ffprobe packet scan")?;
    Ok(parse_packet_times(&String::from_utf8_lossy(&out.stdout)))
}

struct Decoder {
    child: Child,
    stdout: ChildStdout,
    drain: StderrDrain,
}

struct FfmpegSource {
    ffmpeg: PathBuf,
    input: Option<NamedTempFile>,
    info: Option<VideoTrackInfo>,
    timestamps: Vec<f64>,
    frame_dur: f64,
    out_size: Dimensions,
    decoder: Option<Decoder>,
    next: usize,
    exhausted: bool,
}

impl FfmpegSource {
    fn spawn_decoder(&self, input: &Path) -> WarpResult<Decoder> {
        let Dimensions { width, height } = self.out_size;
        let filter = format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease,\
             pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1"
        );
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-v", "error", "-noautorotate", "-i"])
            .arg(input)
            .args([
                "-map",
                "0:v:0",
                "-fps_mode",
                "passthrough",
                "-vf",
                &filter,
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd
            .spawn()
            .map_err(|e| WarpError::media(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WarpError::media("failed to open ffmpeg stdout (unexpected)"))?;
        let drain = StderrDrain::spawn(&mut child);
        Ok(Decoder {
            child,
            stdout,
            drain,
        })
    }

    fn timestamp_of(&self, idx: usize) -> f64 {
        match (self.timestamps.get(idx), self.timestamps.last()) {
            (Some(&t), _) => t,
            (None, Some(&last)) => {
                last + (idx + 1 - self.timestamps.len()) as f64 * self.frame_dur
            }
            (None, None) => idx as f64 * self.frame_dur,
        }
    }
}

/// Fill `buf` completely. `Ok(false)` means clean end of stream before the first byte.
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "truncated video frame",
                ));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

impl SampleSource for FfmpegSource {
    fn video_track(&self) -> Option<&VideoTrackInfo> {
        self.info.as_ref()
    }

    fn configure_output(&mut self, size: Dimensions) -> WarpResult<()> {
        if self.decoder.is_some() || self.next > 0 {
            return Err(WarpError::media(
                "configure_output called after decoding started",
            ));
        }
        self.out_size = size;
        Ok(())
    }

    fn next_video_sample(&mut self) -> WarpResult<Option<MediaSample>> {
        let Some(input) = self.input.as_ref() else {
            return Err(WarpError::media("decoder used after dispose"));
        };
        if self.info.is_none() || self.exhausted {
            return Ok(None);
        }
        if self.decoder.is_none() {
            let dec = self.spawn_decoder(input.path())?;
            self.decoder = Some(dec);
        }

        let Dimensions { width, height } = self.out_size;
        let mut data = vec![0u8; width as usize * height as usize * 4];
        let Some(dec) = self.decoder.as_mut() else {
            return Ok(None);
        };
        let got = read_frame(&mut dec.stdout, &mut data)
            .map_err(|e| WarpError::media(format!("failed to read decoded frame: {e}")))?;
        if !got {
            self.exhausted = true;
            if let Some(mut dec) = self.decoder.take() {
                wait_checked(&mut dec.child, &mut dec.drain, "ffmpeg decoder")?;
            }
            return Ok(None);
        }

        let idx = self.next;
        self.next += 1;
        let ts = self.timestamp_of(idx);
        let dur = self
            .timestamps
            .get(idx + 1)
            .map(|&next| next - ts)
            .filter(|d| *d > 0.0)
            .unwrap_or(self.frame_dur);
        Ok(Some(MediaSample::video(
            ts,
            dur,
            VideoFrame {
                width,
                height,
                data,
            },
        )))
    }

    fn dispose(&mut self) -> WarpResult<()> {
        if let Some(mut dec) = self.decoder.take() {
            kill_quietly(&mut dec.child);
            let _ = dec.drain.collect();
        }
        if let Some(input) = self.input.take() {
            input
                .close()
                .context("failed to remove input temp file")?;
        }
        Ok(())
    }
}

struct Encoder {
    child: Child,
    stdin: ChildStdin,
    drain: StderrDrain,
}

struct AudioSpool {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    sample_rate: u32,
    channels: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Created,
    Started,
    Finalized,
    Cancelled,
}

struct FfmpegContainer {
    opts: FfmpegBackendOpts,
    spec: OutputSpec,
    workdir: Option<TempDir>,
    encoder: Option<Encoder>,
    last: Option<(u64, Vec<u8>)>,
    audio: Option<AudioSpool>,
    state: State,
}

impl FfmpegContainer {
    fn workdir(&self) -> WarpResult<&Path> {
        self.workdir
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| WarpError::media("output container not started"))
    }

    fn write_raw(&mut self, data: &[u8], copies: u64) -> WarpResult<()> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| WarpError::media("video encoder already closed"))?;
        for _ in 0..copies {
            enc.stdin.write_all(data).map_err(|e| {
                WarpError::media(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        }
        Ok(())
    }
}

impl OutputContainer for FfmpegContainer {
    fn start(&mut self) -> WarpResult<()> {
        if self.state != State::Created {
            return Err(WarpError::media("container already started"));
        }
        let workdir = tempfile::Builder::new()
            .prefix("clipwarp-out-")
            .tempdir()
            .context("failed to create output work directory")?;
        let v = self.spec.video;
        let bitrate = v.bitrate.to_string();
        let bufsize = (v.bitrate * 2).to_string();

        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", v.dimensions.width, v.dimensions.height),
            "-r",
            &format!("{}/{}", v.fps.num, v.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            AVC_ENCODER,
            "-preset",
            &self.opts.preset,
            "-profile:v",
            v.profile.label(),
            "-b:v",
            &bitrate,
            "-maxrate",
            &bitrate,
            "-bufsize",
            &bufsize,
            "-pix_fmt",
            "yuv420p",
        ])
        .arg(workdir.path().join("video.mp4"))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| WarpError::media(format!("failed to spawn ffmpeg encoder: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WarpError::media("failed to open ffmpeg stdin (unexpected)"))?;
        let drain = StderrDrain::spawn(&mut child);

        self.encoder = Some(Encoder {
            child,
            stdin,
            drain,
        });
        self.workdir = Some(workdir);
        self.state = State::Started;
        Ok(())
    }

    fn push_video(&mut self, slot: FrameIndex, sample: MediaSample) -> WarpResult<()> {
        if self.state != State::Started {
            return Err(WarpError::media("output container not started"));
        }
        let last_slot = self.last.as_ref().map(|(s, _)| *s);
        if let Some(last) = last_slot
            && slot.0 <= last
        {
            return Err(WarpError::media(
                "container received out-of-order frame slot",
            ));
        }
        let SamplePayload::Video(frame) = sample.payload else {
            return Err(WarpError::media("push_video expects a video sample"));
        };
        let d = self.spec.video.dimensions;
        if frame.width != d.width
            || frame.height != d.height
            || frame.data.len() != d.pixel_count() as usize * 4
        {
            return Err(WarpError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, d.width, d.height
            )));
        }

        // Skipped grid slots hold the previous picture; a late first frame covers the lead-in.
        match self.last.take() {
            Some((prev_slot, prev)) => {
                self.write_raw(&prev, slot.0 - prev_slot - 1)?;
            }
            None => self.write_raw(&frame.data, slot.0)?,
        }
        self.write_raw(&frame.data, 1)?;
        self.last = Some((slot.0, frame.data));
        Ok(())
    }

    fn close_video(&mut self) -> WarpResult<()> {
        match self.encoder.take() {
            Some(Encoder {
                mut child,
                stdin,
                mut drain,
            }) => {
                drop(stdin);
                wait_checked(&mut child, &mut drain, "ffmpeg encoder")
            }
            None => Ok(()),
        }
    }

    fn write_audio(&mut self, sample: MediaSample) -> WarpResult<()> {
        if self.spec.audio.is_none() {
            return Err(WarpError::media("container has no audio track"));
        }
        let SamplePayload::Audio(pcm) = sample.payload else {
            return Err(WarpError::media("write_audio expects an audio sample"));
        };
        if self.audio.is_none() {
            let path = self.workdir()?.join("audio.f32");
            let file = File::create(&path).context("failed to create audio spool")?;
            self.audio = Some(AudioSpool {
                path,
                writer: Some(BufWriter::new(file)),
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            });
        }
        let Some(spool) = self.audio.as_mut() else {
            return Ok(());
        };
        if spool.sample_rate != pcm.sample_rate || spool.channels != pcm.channels {
            return Err(WarpError::validation(
                "audio samples must share one sample rate and channel count",
            ));
        }
        let writer = spool
            .writer
            .as_mut()
            .ok_or_else(|| WarpError::media("audio track already closed"))?;
        for s in &pcm.interleaved_f32 {
            writer
                .write_all(&s.to_le_bytes())
                .context("failed to write audio spool")?;
        }
        Ok(())
    }

    fn close_audio(&mut self) -> WarpResult<()> {
        if let Some(mut writer) = self.audio.as_mut().and_then(|s| s.writer.take()) {
            writer.flush().context("failed to flush audio spool")?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> WarpResult<Vec<u8>> {
        if self.state != State::Started {
            return Err(WarpError::finalize("output container not started"));
        }
        if self.last.is_none() {
            return Err(WarpError::finalize("no video frames were written"));
        }
        self.close_video()
            .map_err(|e| WarpError::finalize(e.to_string()))?;
        self.close_audio()
            .map_err(|e| WarpError::finalize(e.to_string()))?;

        let dir = self.workdir()?.to_path_buf();
        let out_path = dir.join("final.mp4");
        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.args(["-y", "-loglevel", "error"])
            .args(display_rotation_args(self.spec.rotation))
            .arg("-i")
            .arg(dir.join("video.mp4"));
        let audio = match (&self.audio, self.spec.audio) {
            (Some(spool), Some(cfg)) => Some((spool, cfg)),
            _ => None,
        };
        if let Some((spool, _)) = audio {
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &spool.sample_rate.to_string(),
                "-ac",
                &spool.channels.to_string(),
                "-i",
            ])
            .arg(&spool.path);
        }
        cmd.args(["-map", "0:v:0", "-c:v", "copy"]);
        if let Some((_, cfg)) = audio {
            cmd.args([
                "-map",
                "1:a:0",
                "-c:a",
                audio_encoder(cfg.codec),
                "-b:a",
                &cfg.bitrate.to_string(),
            ]);
        }
        cmd.args(["-movflags", "+faststart"]).arg(&out_path);

        run_checked(&mut cmd, "ffmpeg mux").map_err(|e| WarpError::finalize(e.to_string()))?;
        let bytes = std::fs::read(&out_path)
            .map_err(|e| WarpError::finalize(format!("failed to read muxed output: {e}")))?;

        self.audio = None;
        self.workdir = None;
        self.state = State::Finalized;
        Ok(bytes)
    }

    fn cancel(&mut self) -> WarpResult<()> {
        if let Some(mut enc) = self.encoder.take() {
            drop(enc.stdin);
            kill_quietly(&mut enc.child);
            let _ = enc.drain.collect();
        }
        self.audio = None;
        if let Some(dir) = self.workdir.take() {
            dir.close().context("failed to remove output work directory")?;
        }
        if self.state == State::Started {
            self.state = State::Cancelled;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
