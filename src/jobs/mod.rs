pub(crate) mod speed_curve;
pub(crate) mod stitch;

use crate::encode::tier::EncodeTier;
use crate::foundation::error::WarpResult;
use crate::foundation::progress::{Progress, ProgressEvent};
use crate::media::backend::AudioCodec;

/// Counters describing one finished job.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct JobStats {
    pub frames_decoded: u64,
    pub frames_written: u64,
    /// Samples released because they snapped onto an already written slot.
    pub frames_dropped: u64,
    pub clips_used: usize,
    pub clips_skipped: usize,
    pub tier: EncodeTier,
    pub audio_codec: Option<AudioCodec>,
    pub output_duration: f64,
    /// Swallowed teardown failures.
    pub teardown_diagnostics: Vec<String>,
}

/// Container bytes plus statistics.
#[derive(Clone, Debug)]
pub struct JobOutput {
    pub bytes: Vec<u8>,
    pub stats: JobStats,
}

/// Attach teardown diagnostics and report the terminal progress event.
fn conclude(
    job: &str,
    result: WarpResult<JobOutput>,
    diagnostics: Vec<String>,
    progress: Progress<'_>,
) -> WarpResult<JobOutput> {
    match result {
        Ok(mut out) => {
            out.stats.teardown_diagnostics = diagnostics;
            tracing::info!(
                job,
                bytes = out.bytes.len(),
                frames = out.stats.frames_written,
                dropped = out.stats.frames_dropped,
                duration = out.stats.output_duration,
                "job complete"
            );
            progress.emit(ProgressEvent::complete(format!("{job} complete")));
            Ok(out)
        }
        Err(err) => {
            tracing::error!(job, %err, "job failed");
            progress.emit(ProgressEvent::error(format!("{job} failed"), err.to_string()));
            Err(err)
        }
    }
}
