use crate::audio::decode::{AudioDecoder, FfmpegAudioDecoder, WavDecoder};
use crate::audio::prepare::{AudioPrepOpts, prepare_audio_with};
use crate::encode::tier::{negotiate, stitch_tiers};
use crate::foundation::core::{Dimensions, Fps, Rotation};
use crate::foundation::error::{WarpError, WarpResult};
use crate::foundation::progress::{Progress, ProgressEvent, ProgressObserver};
use crate::jobs::{JobOutput, JobStats, conclude};
use crate::media::backend::{
    AudioCapabilityQuery, AudioCodec, AudioEncodeConfig, MediaBackend, OutputSpec, VideoCodec,
    VideoEncodeConfig,
};
use crate::media::sample::MediaSample;
use crate::pipeline::retime::GridRetimer;
use crate::pipeline::teardown::{SourceId, Teardown};

/// Options of a [`StitchJob`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StitchOpts {
    /// Output frame rate.
    pub fps: u32,
    /// Bitrate ceiling; also used when no clip reports a bitrate.
    pub max_bitrate: u64,
    pub audio_bitrate: u64,
    /// Audio codecs in preference order.
    pub audio_codecs: Vec<AudioCodec>,
    pub audio: AudioPrepOpts,
}

impl Default for StitchOpts {
    fn default() -> Self {
        Self {
            fps: 30,
            max_bitrate: 8_000_000,
            audio_bitrate: 192_000,
            audio_codecs: AudioCodec::PREFERENCE.to_vec(),
            audio: AudioPrepOpts::default(),
        }
    }
}

/// Concatenates clips onto one continuous timeline, optionally with a soundtrack.
pub struct StitchJob<'a> {
    backend: &'a dyn MediaBackend,
    opts: StitchOpts,
    audio_decoders: Vec<Box<dyn AudioDecoder>>,
}

struct ProbedClip {
    index: usize,
    source: SourceId,
    duration: Option<f64>,
}

impl<'a> StitchJob<'a> {
    pub fn new(backend: &'a dyn MediaBackend, opts: StitchOpts) -> Self {
        Self {
            backend,
            opts,
            audio_decoders: vec![Box::new(WavDecoder), Box::new(FfmpegAudioDecoder::default())],
        }
    }

    /// Replace the soundtrack decoder chain.
    pub fn with_audio_decoders(mut self, decoders: Vec<Box<dyn AudioDecoder>>) -> Self {
        self.audio_decoders = decoders;
        self
    }

    pub fn opts(&self) -> &StitchOpts {
        &self.opts
    }

    /// Stitch `clips` in order. `audio`, when given, is looped/offset/faded and trimmed to the
    /// written video duration.
    #[tracing::instrument(skip_all, fields(clips = clips.len(), audio = audio.is_some()))]
    pub fn run(
        &self,
        clips: &[Vec<u8>],
        audio: Option<&[u8]>,
        observer: Option<&dyn ProgressObserver>,
    ) -> WarpResult<JobOutput> {
        let progress = Progress::new(observer);
        let mut handles = Teardown::new();
        let result = self.execute(&mut handles, clips, audio, progress);
        let diagnostics = handles.release();
        conclude("stitch", result, diagnostics, progress)
    }

    fn execute(
        &self,
        handles: &mut Teardown,
        clips: &[Vec<u8>],
        audio: Option<&[u8]>,
        progress: Progress<'_>,
    ) -> WarpResult<JobOutput> {
        if clips.is_empty() {
            return Err(WarpError::NoVideosProvided);
        }
        let total = clips.len();
        let fps = Fps::new(self.opts.fps, 1)?;

        progress.step("Analyzing clips", 0.0);
        let mut usable = Vec::with_capacity(total);
        let mut max_dims = Dimensions::new(0, 0);
        let mut max_bitrate: Option<u64> = None;
        let mut rotation: Option<Rotation> = None;
        for (index, bytes) in clips.iter().enumerate() {
            let source = match self.backend.open_input(bytes) {
                Ok(src) => handles.add_source(src),
                Err(err) => {
                    tracing::warn!(clip = index + 1, %err, "clip could not be opened; skipping");
                    continue;
                }
            };
            let Some(info) = handles.source_mut(source)?.video_track().cloned() else {
                tracing::warn!(clip = index + 1, "clip has no video track; skipping");
                handles.release_source(source);
                continue;
            };
            let dims = info.dimensions.unwrap_or_else(|| {
                tracing::warn!(
                    clip = index + 1,
                    "clip dimensions unavailable; assuming fallback"
                );
                Dimensions::FALLBACK
            });
            max_dims = Dimensions::new(
                max_dims.width.max(dims.width),
                max_dims.height.max(dims.height),
            );
            if let Some(b) = info.avg_bitrate {
                max_bitrate = Some(max_bitrate.map_or(b, |m| m.max(b)));
            }
            match rotation {
                None => rotation = Some(info.rotation),
                Some(first) if first != info.rotation => tracing::warn!(
                    clip = index + 1,
                    expected = first.0,
                    found = info.rotation.0,
                    "clip rotation differs from the first clip; keeping the first"
                ),
                Some(_) => {}
            }
            let duration = info
                .track_duration
                .or(info.container_duration)
                .filter(|d| d.is_finite() && *d > 0.0);
            usable.push(ProbedClip {
                index,
                source,
                duration,
            });
        }
        let skipped = total - usable.len();
        if usable.is_empty() {
            return Err(WarpError::no_frames_emitted(format!(
                "none of the {total} clips has a decodable video track"
            )));
        }

        progress.step("Negotiating encoder", 5.0);
        let bitrate = max_bitrate.unwrap_or(self.opts.max_bitrate);
        let tier = negotiate(
            self.backend,
            &stitch_tiers(max_dims, bitrate, self.opts.max_bitrate),
        )?;

        let audio_cfg = match audio {
            Some(_) => self.negotiate_audio(),
            None => None,
        };
        let soundtrack = match (audio, audio_cfg) {
            (Some(bytes), Some(_)) => {
                let estimate: f64 = usable.iter().filter_map(|c| c.duration).sum();
                let decoders: Vec<&dyn AudioDecoder> =
                    self.audio_decoders.iter().map(|d| d.as_ref()).collect();
                Some(prepare_audio_with(
                    &decoders,
                    bytes,
                    estimate,
                    None,
                    &self.opts.audio,
                )?)
            }
            _ => None,
        };

        let spec = OutputSpec {
            video: VideoEncodeConfig {
                codec: VideoCodec::Avc,
                dimensions: tier.dimensions,
                bitrate: tier.bitrate,
                profile: tier.profile,
                fps,
            },
            audio: audio_cfg,
            rotation: rotation.unwrap_or_default(),
        };
        handles.start_output(self.backend.create_output(spec)?, audio_cfg.is_some())?;

        let mut retimer = GridRetimer::new(fps);
        let mut decoded = 0u64;
        for (n, clip) in usable.iter().enumerate() {
            progress.emit(
                ProgressEvent::processing(
                    format!("Processing clip {} of {total}", clip.index + 1),
                    10.0 + 80.0 * n as f32 / usable.len() as f32,
                )
                .with_item(clip.index + 1, total),
            );
            handles.source_mut(clip.source)?.configure_output(tier.dimensions)?;

            let base = retimer.next_slot();
            let mut first_ts = None;
            let mut clip_written = 0u64;
            while let Some(sample) = handles.source_mut(clip.source)?.next_video_sample()? {
                decoded += 1;
                let first = *first_ts.get_or_insert(sample.timestamp);
                match retimer.propose_at(base, (sample.timestamp - first).max(0.0)) {
                    Some(slot) => {
                        let sample =
                            sample.retimed(retimer.slot_timestamp(slot), retimer.frame_duration());
                        handles.output_mut()?.push_video(slot, sample)?;
                        retimer.commit(slot);
                        clip_written += 1;
                    }
                    None => {
                        sample.close();
                        retimer.note_dropped();
                    }
                }
            }
            handles.release_source(clip.source);
            tracing::debug!(
                clip = clip.index + 1,
                frames = clip_written,
                base,
                "clip stitched"
            );
        }

        if retimer.frames_written() == 0 {
            return Err(WarpError::no_frames_emitted(format!(
                "decoded {decoded} samples from {} clips but none reached the encoder",
                usable.len()
            )));
        }
        if retimer.frames_dropped() > 0 {
            tracing::debug!(
                dropped = retimer.frames_dropped(),
                "samples dropped onto already written slots"
            );
        }

        let video_duration = retimer.duration_secs();
        if let Some(track) = soundtrack {
            progress.step("Adding audio", 92.0);
            let track = track.trimmed_to(video_duration);
            handles
                .output_mut()?
                .write_audio(MediaSample::audio(0.0, track.pcm))?;
        }

        progress.step("Finalizing", 95.0);
        handles.close_video()?;
        handles.close_audio()?;
        let bytes = handles.finalize()?;

        Ok(JobOutput {
            bytes,
            stats: JobStats {
                frames_decoded: decoded,
                frames_written: retimer.frames_written(),
                frames_dropped: retimer.frames_dropped(),
                clips_used: usable.len(),
                clips_skipped: skipped,
                tier,
                audio_codec: audio_cfg.map(|c| c.codec),
                output_duration: video_duration,
                teardown_diagnostics: Vec::new(),
            },
        })
    }

    fn negotiate_audio(&self) -> Option<AudioEncodeConfig> {
        let query = AudioCapabilityQuery {
            channels: self.opts.audio.channels,
            sample_rate: self.opts.audio.sample_rate,
            bitrate: self.opts.audio_bitrate,
        };
        match self.backend.best_audio_codec(&self.opts.audio_codecs, &query) {
            Some(codec) => Some(AudioEncodeConfig {
                codec,
                channels: query.channels,
                sample_rate: query.sample_rate,
                bitrate: query.bitrate,
            }),
            None => {
                tracing::warn!(
                    preferences = ?self.opts.audio_codecs,
                    "no supported audio codec; continuing without audio"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/stitch.rs"]
mod tests;
