use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use image::RgbaImage;

use reactions::{
    Background, Card, CardFields, CardRenderer, EncoderSinkOpts, FfmpegLauncher, FontSet,
    FontSource, Fps, Orientation, ParleyTextBackend, ReactionGraph, ReactionLayout,
    ReactionSources, RenderConfig, RenderJob, SubmissionRecord, VideoMetadata,
    animation_start_for, ffmpeg_sink, last_frame_for, load_logo, probe_video, terminate_encoders,
};

/// Raised by the termination handler; checked by every render job between frames.
static CANCEL: LazyLock<Arc<AtomicBool>> = LazyLock::new(Arc::default);

/// How long the main thread gets to unwind after a termination signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "reactions", version, about = "Render scoreboard reaction videos")]
struct Cli {
    /// JSON render config; missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging and encoder output on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the card alone (no audio).
    Card(CardCmd),
    /// Render a vertical reaction: webcam above the card, screen below.
    Reaction(ReactionCmd),
    /// Render a horizontal reaction: card over the full-width webcam.
    Horizontal(ReactionCmd),
    /// Render a reaction from an overlay `externalRun` payload.
    Submission(SubmissionCmd),
}

#[derive(Args, Debug)]
struct CardArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    subtitle: String,
    #[arg(long, default_value = "")]
    hashtag: String,
    #[arg(long)]
    task: String,
    /// Contest time of the submission in milliseconds.
    #[arg(long)]
    time_ms: f64,
    /// Verdict short name, e.g. `AC`.
    #[arg(long)]
    outcome: String,
    #[arg(long)]
    accepted: bool,
    #[arg(long)]
    rank_before: u32,
    #[arg(long)]
    rank_after: u32,
    /// Image file or `#rrggbb`.
    #[arg(long, default_value = "#ffffff")]
    logo: String,
}

impl CardArgs {
    fn fields(&self) -> CardFields {
        CardFields {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            hashtag: self.hashtag.clone(),
            task: self.task.clone(),
            outcome: self.outcome.clone(),
            success: self.accepted,
            time_ms: self.time_ms,
            rank_before: self.rank_before,
            rank_after: self.rank_after,
        }
    }
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Regular face (TTF/OTF).
    #[arg(long)]
    font: PathBuf,
    /// Bold face; the regular face is used when absent.
    #[arg(long)]
    bold_font: Option<PathBuf>,
    /// Monospace face for the status line.
    #[arg(long)]
    mono_font: Option<PathBuf>,
}

impl FontArgs {
    fn font_set(&self) -> anyhow::Result<FontSet> {
        let mut set = FontSet::new(FontSource::read(&self.font)?);
        if let Some(path) = &self.bold_font {
            set = set.with_bold(FontSource::read(path)?);
        }
        if let Some(path) = &self.mono_font {
            set = set.with_mono(FontSource::read(path)?);
        }
        Ok(set)
    }
}

#[derive(Args, Debug)]
struct FootageArgs {
    /// Webcam video; its frame rate and duration drive the card.
    #[arg(long)]
    webcam: PathBuf,
    /// Screen capture (vertical layout only).
    #[arg(long)]
    screen: Option<PathBuf>,
    /// Image file or `#rrggbb` behind the vertical layout.
    #[arg(long, default_value = "#000000")]
    background: String,
    #[arg(long)]
    success_sound: Option<PathBuf>,
    #[arg(long)]
    fail_sound: Option<PathBuf>,
    /// Used when the webcam cannot be probed.
    #[arg(long)]
    fallback_fps: Option<Fps>,
    /// Used when the webcam cannot be probed, in seconds.
    #[arg(long)]
    fallback_duration: Option<f64>,
}

#[derive(Args, Debug)]
struct CardCmd {
    #[command(flatten)]
    card: CardArgs,
    #[command(flatten)]
    fonts: FontArgs,
    #[arg(long, default_value = "30")]
    fps: Fps,
    /// Clip length in seconds.
    #[arg(long)]
    duration: f64,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct ReactionCmd {
    #[command(flatten)]
    card: CardArgs,
    #[command(flatten)]
    fonts: FontArgs,
    #[command(flatten)]
    footage: FootageArgs,
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct SubmissionCmd {
    /// Saved `/api/overlay/externalRun/<id>` response.
    #[arg(long)]
    run_json: PathBuf,
    /// Run id; the output is `<output-dir>/<id>.mp4`.
    #[arg(long)]
    id: String,
    /// `user:password` injected into the run's URLs.
    #[arg(long)]
    cds_auth: Option<String>,
    /// Local logo overriding the run's (remote logos are not downloaded).
    #[arg(long)]
    logo: Option<String>,
    #[arg(long, default_value = "#000000")]
    background: String,
    #[arg(long)]
    success_sound: Option<PathBuf>,
    #[arg(long)]
    fail_sound: Option<PathBuf>,
    #[arg(long)]
    fallback_fps: Option<Fps>,
    #[arg(long)]
    fallback_duration: Option<f64>,
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,
    #[arg(long)]
    horizontal: bool,
    #[arg(long)]
    overwrite: bool,
    #[command(flatten)]
    fonts: FontArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    install_termination_handler()?;

    let mut cfg = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    }
    .with_env_overrides();
    cfg.encoder.verbose |= cli.verbose;

    match cli.cmd {
        Command::Card(args) => cmd_card(&cfg, args),
        Command::Reaction(args) => cmd_reaction(&cfg, args, Orientation::Vertical),
        Command::Horizontal(args) => cmd_reaction(&cfg, args, Orientation::Horizontal),
        Command::Submission(args) => cmd_submission(&cfg, args),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// On SIGINT/SIGTERM: cancel the running job and kill live encoders, then give the main thread
/// [`SHUTDOWN_GRACE`] to report the failure before exiting.
fn install_termination_handler() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("failed to start the signal runtime")?;
    let signals = {
        let _enter = runtime.enter();
        TerminationSignals::install().context("failed to install signal handlers")?
    };
    std::thread::Builder::new()
        .name("signals".to_owned())
        .spawn(move || {
            runtime.block_on(signals.recv());
            tracing::warn!("termination requested; stopping encoders");
            CANCEL.store(true, Ordering::SeqCst);
            let killed = terminate_encoders();
            tracing::debug!(killed, "encoders terminated");
            std::thread::sleep(SHUTDOWN_GRACE);
            tracing::warn!("render did not stop in time; exiting");
            std::process::exit(1);
        })
        .context("failed to spawn the signal thread")?;
    Ok(())
}

#[cfg(unix)]
struct TerminationSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }
}

#[cfg(not(unix))]
struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) {
        tokio::signal::ctrl_c().await.ok();
    }
}

fn cmd_card(cfg: &RenderConfig, args: CardCmd) -> anyhow::Result<()> {
    let last_frame = last_frame_for(args.duration, args.fps);
    let start = animation_start_for(last_frame, args.fps, cfg.reveal_secs);
    let logo = load_logo(&args.card.logo, logo_size(cfg))?;
    let launcher = FfmpegLauncher::new(cfg.encoder.clone());
    render(
        cfg,
        &args.fonts,
        args.card.fields(),
        &logo,
        Timing::new(args.fps, last_frame, start),
        launcher,
        &args.out,
        args.overwrite,
    )
}

fn cmd_reaction(
    cfg: &RenderConfig,
    args: ReactionCmd,
    orientation: Orientation,
) -> anyhow::Result<()> {
    let fields = args.card.fields();
    let logo = load_logo(&args.card.logo, logo_size(cfg))?;
    let footage = args.footage;
    let sources = ReactionSources {
        webcam: footage.webcam.clone(),
        screen: footage.screen.clone(),
        background: footage.background.parse::<Background>()?,
        verdict_sound: verdict_sound(fields.success, &footage.success_sound, &footage.fail_sound),
    };
    let metadata = probe_or_fallback(
        cfg,
        &footage.webcam,
        footage.fallback_fps,
        footage.fallback_duration,
    )?;
    reaction(
        cfg,
        &args.fonts,
        fields,
        &logo,
        &sources,
        metadata,
        orientation,
        &args.out,
        args.overwrite,
    )
}

fn cmd_submission(cfg: &RenderConfig, args: SubmissionCmd) -> anyhow::Result<()> {
    let out = args.output_dir.join(format!("{}.mp4", args.id));
    if out.exists() && !args.overwrite {
        tracing::info!(out = %out.display(), "output exists; pass --overwrite to replace it");
        return Ok(());
    }

    let bytes = std::fs::read(&args.run_json)
        .with_context(|| format!("failed to read '{}'", args.run_json.display()))?;
    let record =
        SubmissionRecord::from_overlay_json(&bytes)?.with_cds_auth(args.cds_auth.as_deref());
    let logo_source = args.logo.as_deref().unwrap_or(&record.logo_url);
    let logo = match load_logo(logo_source, logo_size(cfg)) {
        Ok(logo) => logo,
        Err(e) if args.logo.is_none() => {
            tracing::warn!(error = %e, "team logo unavailable; using a plain tile");
            load_logo(&cfg.card.palette.light_gray.to_hex(), logo_size(cfg))?
        }
        Err(e) => return Err(e.into()),
    };

    let fields = record.to_card_fields();
    let webcam = PathBuf::from(&record.webcam_url);
    let orientation = if args.horizontal {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    };
    let sources = ReactionSources {
        webcam: webcam.clone(),
        screen: record.screen_url.as_ref().map(PathBuf::from),
        background: args.background.parse::<Background>()?,
        verdict_sound: verdict_sound(fields.success, &args.success_sound, &args.fail_sound),
    };
    let metadata = probe_or_fallback(cfg, &webcam, args.fallback_fps, args.fallback_duration)?;
    reaction(cfg, &args.fonts, fields, &logo, &sources, metadata, orientation, &out, true)
}

#[allow(clippy::too_many_arguments)]
fn reaction(
    cfg: &RenderConfig,
    fonts: &FontArgs,
    fields: CardFields,
    logo: &RgbaImage,
    sources: &ReactionSources,
    metadata: VideoMetadata,
    orientation: Orientation,
    out: &Path,
    overwrite: bool,
) -> anyhow::Result<()> {
    let last_frame = last_frame_for(metadata.duration_secs, metadata.fps);
    let start = animation_start_for(last_frame, metadata.fps, cfg.reveal_secs);
    let layout = ReactionLayout::new(orientation, cfg.card.width, cfg.card.height);
    let graph = ReactionGraph::build(&layout, sources, start, metadata.fps)?;
    let launcher = FfmpegLauncher::new(cfg.encoder.clone())
        .with_inputs(graph.inputs)
        .with_filter_complex(graph.filter_complex, graph.maps);
    render(
        cfg,
        fonts,
        fields,
        logo,
        Timing::new(metadata.fps, last_frame, start),
        launcher,
        out,
        overwrite,
    )
}

#[derive(Clone, Copy, Debug)]
struct Timing {
    fps: Fps,
    last_frame: u64,
    animation_start: u64,
}

impl Timing {
    fn new(fps: Fps, last_frame: u64, animation_start: u64) -> Self {
        Self {
            fps,
            last_frame,
            animation_start,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn render(
    cfg: &RenderConfig,
    fonts: &FontArgs,
    fields: CardFields,
    logo: &RgbaImage,
    timing: Timing,
    launcher: FfmpegLauncher,
    out: &Path,
    overwrite: bool,
) -> anyhow::Result<()> {
    let card = Card::new(fields, logo, timing.animation_start, timing.fps, cfg.card.clone())?;
    let backend = ParleyTextBackend::new(&fonts.font_set()?)?;
    let mut renderer = CardRenderer::new(backend, cfg);

    let mut opts = EncoderSinkOpts::new(out);
    opts.overwrite = overwrite;
    opts.verbose = cfg.encoder.verbose;
    let mut sink = ffmpeg_sink(launcher, opts);

    RenderJob::new(timing.last_frame)
        .with_cancel(Arc::clone(&CANCEL))
        .run(&mut renderer, &card, &mut sink)?;
    Ok(())
}

fn probe_or_fallback(
    cfg: &RenderConfig,
    webcam: &Path,
    fallback_fps: Option<Fps>,
    fallback_duration: Option<f64>,
) -> anyhow::Result<VideoMetadata> {
    match probe_video(&cfg.encoder.probe_program, webcam) {
        Ok(meta) => Ok(meta),
        Err(e) => match (fallback_fps, fallback_duration) {
            (Some(fps), Some(duration_secs)) => {
                tracing::warn!(error = %e, %fps, duration_secs, "probe failed; using fallback");
                Ok(VideoMetadata { fps, duration_secs })
            }
            _ => Err(anyhow::Error::from(e).context(format!(
                "cannot probe '{}' (set --fallback-fps and --fallback-duration to skip probing)",
                webcam.display()
            ))),
        },
    }
}

fn verdict_sound(
    success: bool,
    success_sound: &Option<PathBuf>,
    fail_sound: &Option<PathBuf>,
) -> Option<PathBuf> {
    if success {
        success_sound.clone()
    } else {
        fail_sound.clone()
    }
}

fn logo_size(cfg: &RenderConfig) -> u32 {
    cfg.card.logo_size.max(1.0) as u32
}
