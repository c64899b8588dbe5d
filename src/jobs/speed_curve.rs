use crate::animation::easing::Easing;
use crate::encode::tier::{negotiate, speed_curve_tiers};
use crate::foundation::core::{Dimensions, Fps};
use crate::foundation::error::{WarpError, WarpResult};
use crate::foundation::progress::{Progress, ProgressObserver};
use crate::jobs::{JobOutput, JobStats, conclude};
use crate::media::backend::{MediaBackend, OutputSpec, VideoCodec, VideoEncodeConfig};
use crate::pipeline::retime::GridRetimer;
use crate::pipeline::teardown::Teardown;
use crate::warp::mapper::TimeWarp;

/// Options of a [`SpeedCurveJob`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpeedCurveOpts {
    /// Nominal input duration, used when the source reports none.
    pub input_duration: f64,
    /// `<= 0` keeps the input duration and only reshapes timing.
    pub output_duration: f64,
    pub easing: Easing,
    /// Requested bitrate; the probed source bitrate wins when higher.
    pub bitrate: u64,
    /// Output frame rate when the source reports none.
    pub fallback_fps: u32,
}

impl Default for SpeedCurveOpts {
    fn default() -> Self {
        Self {
            input_duration: 5.0,
            output_duration: 0.0,
            easing: Easing::default(),
            bitrate: 8_000_000,
            fallback_fps: 30,
        }
    }
}

/// Re-times one clip through an easing curve.
pub struct SpeedCurveJob<'a> {
    backend: &'a dyn MediaBackend,
    opts: SpeedCurveOpts,
}

impl<'a> SpeedCurveJob<'a> {
    pub fn new(backend: &'a dyn MediaBackend, opts: SpeedCurveOpts) -> Self {
        Self { backend, opts }
    }

    pub fn opts(&self) -> &SpeedCurveOpts {
        &self.opts
    }

    /// Decode `input`, warp every frame time, and encode the result.
    ///
    /// Codec handles are released before this returns, on success and on failure.
    #[tracing::instrument(skip_all, fields(bytes = input.len(), easing = %self.opts.easing))]
    pub fn run(
        &self,
        input: &[u8],
        observer: Option<&dyn ProgressObserver>,
    ) -> WarpResult<JobOutput> {
        let progress = Progress::new(observer);
        let mut handles = Teardown::new();
        let result = self.execute(&mut handles, input, progress);
        let diagnostics = handles.release();
        conclude("speed curve", result, diagnostics, progress)
    }

    fn execute(
        &self,
        handles: &mut Teardown,
        input: &[u8],
        progress: Progress<'_>,
    ) -> WarpResult<JobOutput> {
        progress.step("Opening video", 0.0);
        let src = handles.add_source(self.backend.open_input(input)?);
        let info = handles
            .source_mut(src)?
            .video_track()
            .cloned()
            .ok_or_else(|| WarpError::no_video_track("input has no decodable video track"))?;

        let positive = |v: Option<f64>| v.filter(|d| d.is_finite() && *d > 0.0);
        let input_duration = positive(info.track_duration)
            .or(positive(info.container_duration))
            .or(positive(Some(self.opts.input_duration)))
            .ok_or_else(|| {
                WarpError::validation("input duration is unknown and no positive fallback was given")
            })?;
        let output_duration = if self.opts.output_duration > 0.0 {
            self.opts.output_duration
        } else {
            input_duration
        };
        let fps = match info.avg_fps.map(Fps::from_f64) {
            Some(Ok(fps)) => fps,
            _ => Fps::new(self.opts.fallback_fps, 1)?,
        };
        let dimensions = info.dimensions.unwrap_or_else(|| {
            tracing::warn!(
                fallback = ?Dimensions::FALLBACK,
                "source dimensions unavailable; using fallback size"
            );
            Dimensions::FALLBACK
        });
        let bitrate = self.opts.bitrate.max(info.avg_bitrate.unwrap_or(0));
        tracing::debug!(
            input_duration,
            output_duration,
            fps = fps.as_f64(),
            bitrate,
            "probed source"
        );

        progress.step("Negotiating encoder", 5.0);
        let tier = negotiate(self.backend, &speed_curve_tiers(dimensions, bitrate))?;
        handles.source_mut(src)?.configure_output(tier.dimensions)?;

        let warp = TimeWarp::new(self.opts.easing.clone(), input_duration, output_duration);
        let last_slot = ((output_duration * fps.as_f64()).ceil() as u64).saturating_sub(1);
        let mut retimer = GridRetimer::new(fps).with_max_slot(last_slot);

        let spec = OutputSpec {
            video: VideoEncodeConfig {
                codec: VideoCodec::Avc,
                dimensions: tier.dimensions,
                bitrate: tier.bitrate,
                profile: tier.profile,
                fps,
            },
            audio: None,
            rotation: info.rotation,
        };
        handles.start_output(self.backend.create_output(spec)?, false)?;

        progress.step("Processing frames", 10.0);
        let mut decoded = 0u64;
        let mut first_ts = None;
        let mut reported = 10u32;
        while let Some(sample) = handles.source_mut(src)?.next_video_sample()? {
            decoded += 1;
            let first = *first_ts.get_or_insert(sample.timestamp);
            let source_t = (sample.timestamp - first).max(0.0);
            let out_t = warp.output_time_for_source(source_t);

            match retimer.propose(out_t) {
                Some(slot) => {
                    let sample =
                        sample.retimed(retimer.slot_timestamp(slot), retimer.frame_duration());
                    handles.output_mut()?.push_video(slot, sample)?;
                    retimer.commit(slot);
                }
                None => {
                    sample.close();
                    retimer.note_dropped();
                }
            }

            let pct = 10 + (80.0 * (source_t / input_duration).min(1.0)) as u32;
            if pct > reported {
                reported = pct;
                progress.step("Processing frames", pct as f32);
            }
        }

        if retimer.frames_written() == 0 {
            return Err(WarpError::no_frames_emitted(format!(
                "decoded {decoded} samples but none reached the encoder"
            )));
        }
        if retimer.frames_dropped() > 0 {
            tracing::debug!(
                dropped = retimer.frames_dropped(),
                "samples dropped onto already written slots"
            );
        }

        progress.step("Finalizing", 95.0);
        handles.close_video()?;
        let bytes = handles.finalize()?;

        Ok(JobOutput {
            bytes,
            stats: JobStats {
                frames_decoded: decoded,
                frames_written: retimer.frames_written(),
                frames_dropped: retimer.frames_dropped(),
                clips_used: 1,
                clips_skipped: 0,
                tier,
                audio_codec: None,
                output_duration: retimer.duration_secs(),
                teardown_diagnostics: Vec::new(),
            },
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/speed_curve.rs"]
mod tests;
