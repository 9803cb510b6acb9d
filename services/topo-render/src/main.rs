//! Procedural topographic contour map renderer.
//!
//! Renders layered, domain-warped noise terrain as smoothed contour lines:
//! - Still images (PNG or SVG)
//! - Animations (looping GIF or a PNG frame sequence)
//! - Raw contour polylines as JSON

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use topo_render::config::{load_config, TopoConfig};
use topo_render::pipeline::{dump_contours, render_animation, render_still};

#[derive(Parser, Debug)]
#[command(name = "topo-render")]
#[command(about = "Animated procedural topographic contour maps")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "TOPO_CONFIG")]
    config: Option<PathBuf>,

    /// Noise seed (random when omitted)
    #[arg(long, env = "TOPO_SEED")]
    seed: Option<u64>,

    /// Height grid resolution (cells per side)
    #[arg(long)]
    grid_size: Option<usize>,

    /// Canvas size (pixels per side)
    #[arg(long)]
    canvas_size: Option<usize>,

    /// Number of contour bands
    #[arg(long)]
    contours: Option<usize>,

    /// Domain warp amplitude (0 disables warping)
    #[arg(long)]
    warp: Option<f64>,

    /// Extract contour levels in parallel
    #[arg(long)]
    parallel: bool,

    /// Log level
    #[arg(long, env = "TOPO_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame to a .png or .svg file
    Still {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render an animation to a .gif file or a directory of PNG frames
    Animate {
        #[arg(short, long)]
        output: PathBuf,

        /// Number of frames
        #[arg(long)]
        frames: Option<usize>,
    },

    /// Write the contour polylines of one frame as JSON
    Contours {
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => TopoConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    init_tracing(&config)?;

    info!(config = ?args.config, "Starting topographic renderer");
    for note in config.clamp() {
        warn!("{}", note);
    }

    match &args.command {
        Command::Still { output } => render_still(&config, output)?,
        Command::Animate { output, .. } => {
            render_animation(&config, output)?;
        }
        Command::Contours { output } => dump_contours(&config, output)?,
    }

    Ok(())
}

/// Command-line flags win over the configuration file.
fn apply_overrides(config: &mut TopoConfig, args: &Args) {
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(size) = args.grid_size {
        config.grid.width = size;
        config.grid.height = size;
    }
    if let Some(size) = args.canvas_size {
        config.canvas.width = size;
        config.canvas.height = size;
    }
    if let Some(count) = args.contours {
        config.contours.count = count;
    }
    if let Some(warp) = args.warp {
        config.terrain.warp_amplitude = warp;
    }
    if args.parallel {
        config.contours.parallel = true;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Command::Animate {
        frames: Some(frames),
        ..
    } = args.command
    {
        config.animation.frames = frames;
    }
}

fn init_tracing(config: &TopoConfig) -> Result<()> {
    let level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.logging.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
