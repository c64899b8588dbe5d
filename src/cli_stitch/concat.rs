use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;

use crate::cli_stitch::quote_concat_path;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{WarpError, WarpResult};
use crate::media::process::run_checked;

/// Options for [`concat_with_ffmpeg`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConcatCliOpts {
    /// Size every clip is letterboxed into before concatenation.
    pub size: Dimensions,
    pub fps: u32,
    pub bitrate: u64,
    pub ffmpeg: PathBuf,
}

impl Default for ConcatCliOpts {
    fn default() -> Self {
        Self {
            size: Dimensions::new(1920, 1080),
            fps: 30,
            bitrate: 8_000_000,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Concat-demuxer list of `segments`, one `file` line each.
pub fn build_concat_list(segments: &[PathBuf]) -> String {
    segments
        .iter()
        .map(|p| format!("file {}\n", quote_concat_path(p)))
        .collect()
}

fn intermediate_filter(size: Dimensions, fps: u32) -> String {
    let Dimensions { width, height } = size;
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:(ow-iw)/2:(oh-ih)/2,setsar=1,fps={fps}"
    )
}

/// Re-encode every input to one common intermediate format, then join them without another
/// re-encode through the concat demuxer.
#[tracing::instrument(skip_all, fields(inputs = inputs.len(), output = %output.display()))]
pub fn concat_with_ffmpeg(
    inputs: &[PathBuf],
    output: &Path,
    opts: &ConcatCliOpts,
) -> WarpResult<()> {
    if inputs.is_empty() {
        return Err(WarpError::NoVideosProvided);
    }
    let Dimensions { width, height } = opts.size;
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(WarpError::validation(format!(
            "concat size must be even and non-zero, got {width}x{height}"
        )));
    }

    let work = tempfile::Builder::new()
        .prefix("clipwarp-concat-")
        .tempdir()
        .context("failed to create concat work directory")?;
    let filter = intermediate_filter(opts.size, opts.fps);
    let bitrate = opts.bitrate.to_string();

    let mut segments = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let segment = work.path().join(format!("part_{i:03}.mp4"));
        let mut cmd = Command::new(&opts.ffmpeg);
        cmd.args(["-y", "-v", "error", "-i"])
            .arg(input)
            .args([
                "-map",
                "0:v:0",
                "-vf",
                &filter,
                "-an",
                "-c:v",
                "libx264",
                "-b:v",
                &bitrate,
                "-pix_fmt",
                "yuv420p",
                "-video_track_timescale",
                "90000",
            ])
            .arg(&segment);
        run_checked(&mut cmd, "ffmpeg intermediate encode")?;
        tracing::debug!(clip = i + 1, input = %input.display(), "intermediate written");
        segments.push(segment);
    }

    let list_path = work.path().join("segments.txt");
    std::fs::write(&list_path, build_concat_list(&segments))
        .context("failed to write concat list")?;

    let mut cmd = Command::new(&opts.ffmpeg);
    cmd.args(["-y", "-v", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args(["-c", "copy", "-movflags", "+faststart"])
        .arg(output);
    run_checked(&mut cmd, "ffmpeg concat")?;
    tracing::info!(segments = segments.len(), "concatenated");
    Ok(())
}
