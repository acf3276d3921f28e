use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "clipweave", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a project to MP4 or GIF (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single composited frame as a PNG.
    Frame(FrameArgs),
    /// List the built-in animation presets.
    Presets,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path; overrides `outPath` in the project.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Faster, lower quality encoding.
    #[arg(long)]
    fast: bool,

    /// Debug logging and ffmpeg diagnostics.
    #[arg(long)]
    verbose: bool,

    /// Keep the scratch directory.
    #[arg(long)]
    keep_tmp: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbose = matches!(&cli.cmd, Command::Render(a) if a.verbose);
    clipweave::logging::init_logging(&clipweave::logging::LoggingConfig {
        json: cli.log_json,
        ..clipweave::logging::LoggingConfig::for_verbosity(verbose)
    });

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Presets => cmd_presets(),
    }
}

fn load_project(path: &std::path::Path) -> anyhow::Result<clipweave::ProjectSpec> {
    clipweave::ProjectSpec::load(path)
        .with_context(|| format!("load project '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut project = load_project(&args.in_path)?;
    if let Some(out) = args.out {
        project.format = None;
        project.out_path = Some(std::path::absolute(&out).unwrap_or(out));
    }
    project.fast |= args.fast;
    project.verbose |= args.verbose;
    project.keep_tmp |= args.keep_tmp;

    let presets = clipweave::PresetTable::builtin()?;
    let (cfg, timeline) = project.build(&presets).context("build timeline")?;
    let out_path = cfg.out_path.clone();

    if !clipweave::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for rendering, but was not found on PATH");
    }
    let mut session = clipweave::RenderSession::new(cfg, timeline)?;
    let stats = session.render_to_file()?;

    eprintln!(
        "wrote {} ({} frames)",
        out_path.display(),
        stats.frames_total
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut project = load_project(&args.in_path)?;
    if project.out_path.is_none() {
        // Only the canvas settings matter for a still.
        project.out_path = Some(args.out.clone());
    }
    let presets = clipweave::PresetTable::builtin()?;
    let (cfg, timeline) = project.build(&presets).context("build timeline")?;

    let mut session = clipweave::RenderSession::new(cfg, timeline)?;
    let frame = session.render_frame_at(args.time);
    // Release decoders before reporting.
    session.close()?;
    let frame = frame?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    let presets = clipweave::PresetTable::builtin()?;
    for name in presets.names() {
        println!("{name}");
    }
    Ok(())
}
