use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context as _;

use crate::animation::ease::{Ease, resolve_preset};
use crate::cli_stitch::quote_concat_path;
use crate::foundation::error::{WarpError, WarpResult};
use crate::media::process::run_checked;
use crate::warp::lut::{closed_form_time_remap, compute_easing_lut};

/// Options for [`speed_ramp_with_ffmpeg`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RampCliOpts {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Catalog easing name; unknown names ramp linearly.
    #[serde(default = "default_easing")]
    pub easing: String,
    pub input_duration: f64,
    /// `<= 0` keeps the input duration.
    #[serde(default)]
    pub output_duration: f64,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
}

fn default_easing() -> String {
    Ease::InOutSine.name().to_owned()
}

fn default_fps() -> u32 {
    30
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

/// How [`speed_ramp_with_ffmpeg`] produced its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampMethod {
    /// A single `setpts` filter pass.
    Filter,
    /// Frame extraction, LUT reorder and concat-list reassembly.
    FrameLut { frames: usize },
}

/// Concat-demuxer list showing `lut[i]` (0-based source frame) for `frame_duration` seconds each.
pub fn build_frame_list(lut: &[usize], frame_dir: &Path, frame_duration: f64) -> String {
    let mut list = String::from("ffconcat version 1.0\n");
    let mut last = None;
    for &src in lut {
        let file = quote_concat_path(&frame_dir.join(frame_file_name(src)));
        list.push_str(&format!("file {file}\nduration {frame_duration:.6}\n"));
        last = Some(file);
    }
    // The demuxer ignores the final duration unless the last entry is repeated.
    if let Some(file) = last {
        list.push_str(&format!("file {file}\n"));
    }
    list
}

fn frame_file_name(zero_based: usize) -> String {
    format!("frame_{:06}.png", zero_based + 1)
}

/// Re-time `opts.input` with the system `ffmpeg`.
///
/// Presets with an invertible closed form run as one filter pass; everything else is
/// re-assembled from extracted frames through [`compute_easing_lut`].
#[tracing::instrument(skip_all, fields(input = %opts.input.display(), easing = %opts.easing))]
pub fn speed_ramp_with_ffmpeg(opts: &RampCliOpts) -> WarpResult<RampMethod> {
    if !opts.input_duration.is_finite() || opts.input_duration <= 0.0 {
        return Err(WarpError::validation("input duration must be > 0"));
    }
    if opts.fps == 0 {
        return Err(WarpError::validation("fps must be > 0"));
    }
    let output_duration = if opts.output_duration > 0.0 {
        opts.output_duration
    } else {
        opts.input_duration
    };
    let ease = resolve_preset(&opts.easing);

    if let Some(filter) = closed_form_time_remap(ease, opts.input_duration, output_duration) {
        let mut cmd = Command::new(&opts.ffmpeg);
        cmd.args(["-y", "-v", "error", "-i"])
            .arg(&opts.input)
            .args([
                "-vf",
                &format!("{filter},fps={}", opts.fps),
                "-t",
                &format!("{output_duration:.6}"),
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&opts.output);
        run_checked(&mut cmd, "ffmpeg speed ramp")?;
        tracing::info!(filter, "speed ramp written with a single filter pass");
        return Ok(RampMethod::Filter);
    }

    let work = tempfile::Builder::new()
        .prefix("clipwarp-ramp-")
        .tempdir()
        .context("failed to create frame directory")?;
    let mut extract = Command::new(&opts.ffmpeg);
    extract
        .args(["-y", "-v", "error", "-i"])
        .arg(&opts.input)
        .args([
            "-t",
            &format!("{:.6}", opts.input_duration),
            "-vf",
            &format!("fps={}", opts.fps),
        ])
        .arg(work.path().join("frame_%06d.png"));
    run_checked(&mut extract, "ffmpeg frame extraction")?;

    let frames = std::fs::read_dir(work.path())
        .context("failed to list extracted frames")?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("frame_"))
        .count();
    if frames == 0 {
        return Err(WarpError::no_frames_emitted(format!(
            "ffmpeg extracted no frames from '{}'",
            opts.input.display()
        )));
    }

    let lut = compute_easing_lut(ease.name(), frames);
    let list_path = work.path().join("frames.ffconcat");
    std::fs::write(
        &list_path,
        build_frame_list(&lut, work.path(), output_duration / frames as f64),
    )
    .context("failed to write frame list")?;

    let mut assemble = Command::new(&opts.ffmpeg);
    assemble
        .args(["-y", "-v", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args([
            "-fps_mode",
            "cfr",
            "-r",
            &opts.fps.to_string(),
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&opts.output);
    run_checked(&mut assemble, "ffmpeg frame reassembly")?;
    tracing::info!(frames, "speed ramp written from extracted frames");
    Ok(RampMethod::FrameLut { frames })
}
