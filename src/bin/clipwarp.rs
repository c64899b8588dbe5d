use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use clipwarp::{
    ConcatCliOpts, Dimensions, Easing, JobOutput, MediaBackend, MemoryBackend, ProgressEvent,
    RampCliOpts, SpeedCurveJob, SpeedCurveOpts, StitchJob, StitchOpts, SyntheticClip,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipwarp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-time one clip through an easing curve.
    SpeedCurve(SpeedCurveArgs),
    /// Concatenate clips onto one timeline, optionally with a soundtrack.
    Stitch(StitchArgs),
    /// Print the validation report and speed profile of an easing as JSON.
    Analyze(AnalyzeArgs),
    /// Print the output-frame to source-frame lookup table of an easing as JSON.
    Lut(LutArgs),
    /// Speed-ramp a file with the system `ffmpeg` (no backend negotiation).
    RampCli(RampArgs),
    /// Concatenate files with the system `ffmpeg` concat demuxer.
    ConcatCli(ConcatArgs),
}

#[derive(Parser, Debug)]
struct SpeedCurveArgs {
    /// Input video (a synthetic clip JSON with `--dry-run`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// JSON file with job options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Easing name or `cubic-bezier(x1,y1,x2,y2)`.
    #[arg(long)]
    easing: Option<String>,

    /// Output duration in seconds; omitted or `<= 0` keeps the input duration.
    #[arg(long)]
    output_duration: Option<f64>,

    /// Run against the in-memory backend.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct StitchArgs {
    /// Input clips in timeline order.
    #[arg(long = "in", required = true)]
    in_paths: Vec<PathBuf>,

    /// Soundtrack (WAV, or anything ffmpeg decodes with `media-ffmpeg`).
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// JSON file with job options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Run against the in-memory backend.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    #[arg(long, default_value = "easeInOutSine")]
    easing: String,

    #[arg(long, default_value_t = 5.0)]
    input_duration: f64,

    /// Defaults to the input duration.
    #[arg(long)]
    output_duration: Option<f64>,

    #[arg(long, default_value_t = 11)]
    samples: usize,
}

#[derive(Parser, Debug)]
struct LutArgs {
    #[arg(long, default_value = "easeInOutSine")]
    easing: String,

    #[arg(long)]
    frames: usize,
}

#[derive(Parser, Debug)]
struct RampArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    out: PathBuf,

    /// Catalog easing name.
    #[arg(long, default_value = "easeInOutSine")]
    easing: String,

    #[arg(long)]
    input_duration: f64,

    #[arg(long, default_value_t = 0.0)]
    output_duration: f64,

    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Parser, Debug)]
struct ConcatArgs {
    #[arg(long = "in", required = true)]
    in_paths: Vec<PathBuf>,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1920)]
    width: u32,

    #[arg(long, default_value_t = 1080)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipwarp=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::SpeedCurve(args) => cmd_speed_curve(args),
        Command::Stitch(args) => cmd_stitch(args),
        Command::Analyze(args) => cmd_analyze(args),
        Command::Lut(args) => cmd_lut(args),
        Command::RampCli(args) => cmd_ramp(args),
        Command::ConcatCli(args) => cmd_concat(args),
    }
}

fn print_progress(event: &ProgressEvent) {
    match (event.current_item, event.total_items) {
        (Some(cur), Some(total)) => {
            eprintln!("[{:>5.1}%] {} ({cur}/{total})", event.percent, event.message)
        }
        _ => eprintln!("[{:>5.1}%] {}", event.percent, event.message),
    }
}

fn load_config<T: serde::de::DeserializeOwned + Default>(path: Option<&Path>) -> anyhow::Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config '{}'", path.display()))
}

/// Read an input for the selected backend. Dry runs take synthetic clip JSON.
fn read_input(path: &Path, dry_run: bool) -> anyhow::Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("read input '{}'", path.display()))?;
    if !dry_run {
        return Ok(bytes);
    }
    let clip: SyntheticClip = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse synthetic clip '{}'", path.display()))?;
    Ok(clip.to_bytes())
}

fn make_backend(dry_run: bool) -> anyhow::Result<Box<dyn MediaBackend>> {
    if dry_run {
        return Ok(Box::new(MemoryBackend::new()));
    }
    ffmpeg_backend()
}

#[cfg(feature = "media-ffmpeg")]
fn ffmpeg_backend() -> anyhow::Result<Box<dyn MediaBackend>> {
    let backend = clipwarp::FfmpegBackend::new(clipwarp::FfmpegBackendOpts::default());
    if !backend.is_available() {
        anyhow::bail!("ffmpeg/ffprobe not found on PATH");
    }
    Ok(Box::new(backend))
}

#[cfg(not(feature = "media-ffmpeg"))]
fn ffmpeg_backend() -> anyhow::Result<Box<dyn MediaBackend>> {
    anyhow::bail!("clipwarp was built without the `media-ffmpeg` feature; use --dry-run")
}

fn write_output(out: &Path, output: &JobOutput) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, &output.bytes)
        .with_context(|| format!("write output '{}'", out.display()))?;
    println!("{}", serde_json::to_string_pretty(&output.stats)?);
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_speed_curve(args: SpeedCurveArgs) -> anyhow::Result<()> {
    let mut opts: SpeedCurveOpts = load_config(args.config.as_deref())?;
    if let Some(easing) = &args.easing {
        opts.easing = Easing::parse(easing)?;
    }
    if let Some(d) = args.output_duration {
        opts.output_duration = d;
    }

    let input = read_input(&args.in_path, args.dry_run)?;
    let backend = make_backend(args.dry_run)?;
    let job = SpeedCurveJob::new(backend.as_ref(), opts);
    let output = job.run(&input, Some(&print_progress))?;
    write_output(&args.out, &output)
}

fn cmd_stitch(args: StitchArgs) -> anyhow::Result<()> {
    let mut opts: StitchOpts = load_config(args.config.as_deref())?;
    if let Some(fps) = args.fps {
        opts.fps = fps;
    }

    let clips = args
        .in_paths
        .iter()
        .map(|p| read_input(p, args.dry_run))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let audio = args
        .audio
        .as_ref()
        .map(|p| std::fs::read(p).with_context(|| format!("read audio '{}'", p.display())))
        .transpose()?;

    let backend = make_backend(args.dry_run)?;
    let job = StitchJob::new(backend.as_ref(), opts);
    let output = job.run(&clips, audio.as_deref(), Some(&print_progress))?;
    write_output(&args.out, &output)
}

#[derive(serde::Serialize)]
struct AnalyzeReport {
    easing: String,
    monotonic: bool,
    validation: clipwarp::WarpValidation,
    /// Output time spent on the first half of the input.
    first_half_output: f64,
    analysis: clipwarp::CurveAnalysis,
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let easing = Easing::parse(&args.easing)?;
    let output_duration = args.output_duration.unwrap_or(args.input_duration);
    let report = AnalyzeReport {
        easing: easing.to_string(),
        monotonic: clipwarp::is_monotonic(&easing),
        validation: clipwarp::validate_warp_function(
            &easing,
            Some(args.input_duration),
            Some(output_duration),
        ),
        first_half_output: clipwarp::calculate_warped_duration(
            0.0,
            args.input_duration / 2.0,
            args.input_duration,
            output_duration,
            &easing,
        ),
        analysis: clipwarp::analyze_warp_curve(
            &easing,
            args.input_duration,
            output_duration,
            args.samples,
        ),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_lut(args: LutArgs) -> anyhow::Result<()> {
    let easing = Easing::parse(&args.easing)?;
    let lut = clipwarp::easing_lut(&easing, args.frames);
    println!("{}", serde_json::to_string(&lut)?);
    Ok(())
}

fn cmd_ramp(args: RampArgs) -> anyhow::Result<()> {
    let opts = RampCliOpts {
        input: args.in_path,
        output: args.out,
        easing: args.easing,
        input_duration: args.input_duration,
        output_duration: args.output_duration,
        fps: args.fps,
        ffmpeg: PathBuf::from("ffmpeg"),
    };
    if !clipwarp::is_tool_available(&opts.ffmpeg) {
        anyhow::bail!("ffmpeg not found on PATH");
    }
    let method = clipwarp::speed_ramp_with_ffmpeg(&opts)?;
    eprintln!("wrote {} ({method:?})", opts.output.display());
    Ok(())
}

fn cmd_concat(args: ConcatArgs) -> anyhow::Result<()> {
    let opts = ConcatCliOpts {
        size: Dimensions::new(args.width, args.height),
        fps: args.fps,
        ..ConcatCliOpts::default()
    };
    if !clipwarp::is_tool_available(&opts.ffmpeg) {
        anyhow::bail!("ffmpeg not found on PATH");
    }
    clipwarp::concat_with_ffmpeg(&args.in_paths, &args.out, &opts)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
