use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gifweave::{
    Canvas, Compositor, CpuPresenter, CpuPresenterOpts, CpuSurface, FrameStore, GifCodec,
    GifCodecOpts, Player, PlayerOpts, Schedule,
};

#[derive(Parser, Debug)]
#[command(name = "gifweave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print animation metadata as JSON.
    Info(InfoArgs),
    /// Write every composed canvas as a PNG plus a timeline.
    Export(ExportArgs),
    /// Play through a letterboxing presenter and write each output frame.
    Present(PresentArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Stop after this many composed frames even if the animation loops forever.
    #[arg(long, default_value_t = 256)]
    max_steps: u32,

    /// Raise shorter frame delays to this many milliseconds.
    #[arg(long)]
    min_delay_ms: Option<u32>,
}

#[derive(Parser, Debug)]
struct PresentArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels.
    #[arg(long)]
    width: u32,

    /// Output height in pixels.
    #[arg(long)]
    height: u32,

    /// Stop after this many ticks even if the animation loops forever.
    #[arg(long, default_value_t = 256)]
    max_steps: u32,
}

#[derive(serde::Serialize)]
struct TimelineEntry {
    step: u32,
    delay_ms: u32,
    finished: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Export(args) => cmd_export(args),
        Command::Present(args) => cmd_present(args),
    }
}

fn open_gif(path: &Path, min_delay_ms: Option<u32>) -> anyhow::Result<GifCodec> {
    let mut opts = GifCodecOpts::from_env();
    if min_delay_ms.is_some() {
        opts.min_delay_ms = min_delay_ms;
    }
    let codec =
        GifCodec::open(path, opts).with_context(|| format!("open gif '{}'", path.display()))?;
    Ok(codec)
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    use gifweave::ImageCodec as _;

    let codec = open_gif(&args.in_path, None)?;
    let json = serde_json::to_string_pretty(&codec.metadata()).context("serialize metadata")?;
    println!("{json}");
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let codec = open_gif(&args.in_path, args.min_delay_ms)?;
    let mut store = FrameStore::new(codec);
    let mut engine: Compositor<CpuSurface> = Compositor::new(&store.metadata());

    create_dir(&args.out)?;

    let mut timeline = Vec::new();
    for step in 0..args.max_steps {
        let result = engine
            .step(&mut store)
            .with_context(|| format!("compose step {step}"))?;
        let surface = result.surface;
        write_png(
            &args.out.join(format!("frame_{step:04}.png")),
            &surface.to_straight_rgba8(),
            surface.width(),
            surface.height(),
        )?;
        timeline.push(TimelineEntry {
            step,
            delay_ms: result.delay_ms,
            finished: result.finished,
        });
        if result.finished {
            break;
        }
    }

    let timeline_path = args.out.join("timeline.json");
    let f = std::fs::File::create(&timeline_path)
        .with_context(|| format!("create '{}'", timeline_path.display()))?;
    serde_json::to_writer_pretty(f, &timeline).context("write timeline JSON")?;

    eprintln!(
        "wrote {} frames to {}",
        timeline.len(),
        args.out.display()
    );
    Ok(())
}

fn cmd_present(args: PresentArgs) -> anyhow::Result<()> {
    let codec = open_gif(&args.in_path, None)?;
    let presenter = CpuPresenter::new(CpuPresenterOpts {
        output: Canvas {
            width: args.width,
            height: args.height,
        },
        ..CpuPresenterOpts::default()
    })?;
    let mut player = Player::new(codec, presenter, PlayerOpts::default());

    create_dir(&args.out)?;

    let mut written = 0u64;
    for tick in 0..args.max_steps {
        let schedule = player.tick().with_context(|| format!("tick {tick}"))?;
        let presenter = player.presenter();
        if presenter.presented() > written
            && let Some(frame) = presenter.last_frame()
        {
            let straight = CpuSurface::from_premul_bytes(
                Canvas {
                    width: frame.width,
                    height: frame.height,
                },
                frame.data.clone(),
            )?
            .to_straight_rgba8();
            write_png(
                &args.out.join(format!("frame_{written:04}.png")),
                &straight,
                frame.width,
                frame.height,
            )?;
            written = presenter.presented();
        }
        if schedule == Schedule::Stop {
            break;
        }
    }

    let stats = player.stats();
    eprintln!(
        "presented {} frames ({} decode errors, {} recoveries) to {}",
        stats.presented,
        stats.decode_errors,
        stats.recoveries,
        args.out.display()
    );
    Ok(())
}

fn create_dir(dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))
}

fn write_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
