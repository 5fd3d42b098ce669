use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "slidesage", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the scene schedule of a script as JSON.
    Timeline(TimelineArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Record the whole script (WebM via `ffmpeg`, or raw RGBA frames).
    Record(RecordArgs),
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug, Clone)]
struct SceneArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output quality tier.
    #[arg(long, value_enum, default_value_t = QualityChoice::Standard)]
    quality: QualityChoice,

    /// Scene advance policy. Overrides `--playback-config`.
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,

    /// Playback configuration JSON.
    #[arg(long)]
    playback_config: Option<PathBuf>,

    /// Directory searched for `<query-slug>.{mp4,webm,mov,png,jpg,jpeg,webp}` backgrounds.
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Image used when a scene has no media of its own.
    #[arg(long)]
    default_image: Option<PathBuf>,

    /// Font for captions and chrome. Falls back to `SLIDESAGE_FONT`.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Playback time in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output path. Defaults to `<title>_explainer.<ext>` in the working directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write raw opaque RGBA8 frames instead of WebM (no `ffmpeg` needed).
    #[arg(long)]
    raw: bool,

    /// Capture frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Standard,
    High,
}

impl From<QualityChoice> for slidesage::QualityPreset {
    fn from(q: QualityChoice) -> Self {
        match q {
            QualityChoice::Standard => Self::Standard,
            QualityChoice::High => Self::High,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeChoice {
    Fixed,
    SpeechGated,
}

impl From<ModeChoice> for slidesage::PlaybackMode {
    fn from(m: ModeChoice) -> Self {
        match m {
            ModeChoice::Fixed => Self::FixedDuration,
            ModeChoice::SpeechGated => Self::SpeechGated,
        }
    }
}

#[derive(serde::Serialize)]
struct TimelineReport<'a> {
    title: &'a str,
    total_duration: f64,
    scenes: Vec<SceneReport<'a>>,
}

#[derive(serde::Serialize)]
struct SceneReport<'a> {
    index: usize,
    speaker: slidesage::Speaker,
    start: f64,
    duration: f64,
    end: f64,
    visual_search_query: &'a str,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive("slidesage=info".parse()?)
        .from_env_lossy();
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args),
    }
}

fn read_script(path: &Path) -> anyhow::Result<slidesage::Script> {
    let f = File::open(path).with_context(|| format!("open script '{}'", path.display()))?;
    let script = slidesage::Script::from_reader(BufReader::new(f))
        .with_context(|| format!("parse script '{}'", path.display()))?;
    Ok(script)
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let timeline = slidesage::Timeline::from_script(&script)?;

    let report = TimelineReport {
        title: &script.title,
        total_duration: timeline.total_duration(),
        scenes: script
            .scenes
            .iter()
            .zip(timeline.spans())
            .enumerate()
            .map(|(index, (scene, span))| SceneReport {
                index,
                speaker: scene.speaker,
                start: span.start,
                duration: span.duration,
                end: span.end(),
                visual_search_query: &scene.visual_search_query,
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn playback_config(args: &SceneArgs) -> anyhow::Result<slidesage::PlaybackConfig> {
    let mut config = match &args.playback_config {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read playback config '{}'", path.display()))?;
            slidesage::PlaybackConfig::from_json_str(&s)?
        }
        None => slidesage::PlaybackConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    Ok(config)
}

fn load_media(
    args: &SceneArgs,
    script: &slidesage::Script,
) -> anyhow::Result<Vec<slidesage::MediaHandle>> {
    let provider: Box<dyn slidesage::MediaProvider> = match &args.media_dir {
        Some(dir) => Box::new(slidesage::DirectoryMediaProvider::new(dir)),
        None => Box::new(slidesage::NoMediaProvider),
    };
    let mut loader = slidesage::MediaLoader::new(provider);
    if let Some(path) = &args.default_image {
        loader = loader.with_default_image_file(path)?;
    }
    Ok(loader.load_script(script))
}

fn build_session(
    args: &SceneArgs,
    script: &slidesage::Script,
    capture: slidesage::CaptureConfig,
    sink: Box<dyn slidesage::CaptureSink>,
) -> anyhow::Result<slidesage::ExplainerSession> {
    let playback = playback_config(args)?;
    let settings = slidesage::RenderSettings {
        font_path: args.font.clone(),
        ..slidesage::RenderSettings::default()
    }
    .with_env_font();
    let renderer = slidesage::CpuRenderer::new(capture.canvas, settings)?;
    if !renderer.has_font() {
        tracing::warn!("no font configured (use --font or SLIDESAGE_FONT); text is skipped");
    }
    let narrator = slidesage::EstimatedNarrator::new(playback.words_per_second);
    let media = load_media(args, script)?;

    let opts = slidesage::ExplainerSessionOpts { playback, capture };
    Ok(slidesage::ExplainerSession::new(
        script,
        media,
        Box::new(renderer),
        Box::new(narrator),
        sink,
        opts,
    )?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = read_script(&args.scene.in_path)?;
    let capture = slidesage::CaptureConfig::for_preset(args.scene.quality.into());
    let mut session = build_session(
        &args.scene,
        &script,
        capture,
        Box::new(slidesage::RawFrameSink::new()),
    )?;

    let frame = session.render_still(args.at)?;
    frame.write_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let script = read_script(&args.scene.in_path)?;
    let mut capture = slidesage::CaptureConfig::for_preset(args.scene.quality.into());
    capture.fps = slidesage::Fps::new(args.fps, 1)?;

    let sink: Box<dyn slidesage::CaptureSink> = if args.raw {
        Box::new(slidesage::RawFrameSink::new())
    } else {
        if !slidesage::is_ffmpeg_on_path() {
            anyhow::bail!("ffmpeg is required for WebM output (or pass --raw)");
        }
        Box::new(slidesage::FfmpegCaptureSink::new())
    };

    let mut session = build_session(&args.scene, &script, capture, sink)?;
    let artifact = session.record()?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(artifact.file_name(&script.title)));
    artifact.write_to(&out)?;

    let stats = session.last_stats();
    eprintln!(
        "wrote {} ({} frames, {:.1}s, {} bytes{})",
        out.display(),
        artifact.frame_count,
        artifact.duration_secs,
        artifact.bytes.len(),
        if stats.completed { "" } else { ", timed out" }
    );
    Ok(())
}
