//! Headless RAMPART runner.
//!
//! Plays encounters in a synthetic room with an automatic gunner and prints a
//! JSON summary on stdout. Logs go to stderr.
//!
//! ```bash
//! rampart --config encounter.json --seed 7 --encounters 3
//! rampart --realtime --table --verbose
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use glam::DVec3;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rampart_app::game_loop::{spawn_game_loop, LoopSettings};
use rampart_app::gunner::AutoGunner;
use rampart_app::setup::{build_engine, load_config, AppError, RoomSpec};
use rampart_app::state::RunSummary;

#[derive(Parser)]
#[command(name = "rampart")]
#[command(about = "Headless wave-defense encounter runner")]
#[command(version)]
struct Cli {
    /// Encounter config (JSON). Defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the config's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Room width in meters
    #[arg(long, default_value = "4.0")]
    width: f64,

    /// Room depth in meters
    #[arg(long, default_value = "4.0")]
    depth: f64,

    /// Room height in meters
    #[arg(long, default_value = "2.5")]
    height: f64,

    /// Put a table in front of the viewer
    #[arg(long)]
    table: bool,

    /// Number of encounters to play (restarts in between)
    #[arg(short, long, default_value = "1")]
    encounters: u32,

    /// Maximum ticks before giving up
    #[arg(long, default_value = "108000")]
    max_ticks: u64,

    /// Ticks between gunner shots
    #[arg(long, default_value = "2")]
    fire_every: u32,

    /// Run at wall-clock speed instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout carries the summary. RUST_LOG wins over --verbose
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(cli.verbose))),
        )
        .init();

    match run(&cli) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                tracing::error!(%err, "failed to serialize summary");
                process::exit(1);
            }
        },
        Err(err) => {
            tracing::error!(%err, "rampart failed");
            process::exit(1);
        }
    }
}

/// Log filter used when RUST_LOG is not set.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn run(cli: &Cli) -> Result<RunSummary, AppError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    let room = RoomSpec {
        width: cli.width,
        depth: cli.depth,
        height: cli.height,
        table: cli.table,
    };
    let viewer = match &config.objective.placement {
        Some(placement) => placement.viewer_position,
        None => DVec3::new(0.0, 1.6, room.depth / 2.0 - 0.2),
    };

    let engine = build_engine(config, &room)?;
    let gunner = AutoGunner::new(viewer, cli.fire_every, cli.encounters.saturating_sub(1));
    let settings = LoopSettings {
        realtime: cli.realtime,
        max_ticks: cli.max_ticks,
        max_encounters: cli.encounters.max(1),
    };

    tracing::info!(
        encounters = settings.max_encounters,
        realtime = settings.realtime,
        "starting game loop"
    );
    let game_loop = spawn_game_loop(engine, Some(gunner), settings)?;
    let summary = game_loop.join();
    tracing::info!(
        victories = summary.victories,
        defeats = summary.defeats,
        faults = summary.faults,
        "run finished"
    );
    Ok(summary)
}
