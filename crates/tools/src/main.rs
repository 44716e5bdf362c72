use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pursuit_core::{Difficulty, Level, PathStats, Session, SessionConfig, SimEvent};
use pursuit_tools::Autopilot;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Run a pursuit session headless with a scripted player and print a JSON summary.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML session configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// ASCII maze file; the built-in maze when omitted
    #[arg(short, long)]
    level: Option<PathBuf>,
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(short, long)]
    difficulty: Option<Difficulty>,
    #[arg(short, long, default_value_t = 3600)]
    frames: u32,
    /// Wall-clock seconds fed to the scheduler per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f64,
    /// Compute paths inline; makes the run reproducible from the seed
    #[arg(long)]
    sync_paths: bool,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    difficulty: Difficulty,
    frames: u32,
    ticks: u64,
    elapsed_seconds: f64,
    dropped_seconds: f64,
    objectives_collected: usize,
    objectives_total: usize,
    rage: bool,
    times_caught: usize,
    pursuers_spawned: usize,
    pursuers_active: usize,
    max_active_lights: usize,
    path_stats: PathStats,
    snapshot_hash: String,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(difficulty) = args.difficulty {
        config.difficulty = difficulty;
    }
    if args.sync_paths {
        config.async_paths = false;
    }

    let level = match &args.level {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read level file: {}", path.display()))?;
            Level::parse(&text).with_context(|| format!("Invalid level: {}", path.display()))?
        }
        None => Level::builtin(),
    };

    let seed = config.seed;
    let mut session = Session::new(level, config).context("Failed to start session")?;
    let mut pilot = Autopilot::new(seed ^ 0x9e37_79b9_7f4a_7c15);

    let mut dropped_seconds = 0.0;
    let mut times_caught = 0;
    let mut pursuers_spawned = 0;
    let mut max_active_lights = 0;
    for _ in 0..args.frames {
        let input = pilot.steer(session.grid(), session.player().position);
        session.set_input(input);
        let report = session.advance(args.frame_dt);
        dropped_seconds += report.dropped_seconds;
        max_active_lights = max_active_lights.max(session.lights().active_count());
        for event in &report.events {
            match event {
                SimEvent::PlayerCaught { .. } => times_caught += 1,
                SimEvent::PursuerSpawned { .. } => pursuers_spawned += 1,
                _ => {}
            }
        }
    }

    let summary = Summary {
        seed,
        difficulty: session.difficulty(),
        frames: args.frames,
        ticks: session.tick(),
        elapsed_seconds: session.elapsed(),
        dropped_seconds,
        objectives_collected: session.total_objectives() - session.remaining_objectives().len(),
        objectives_total: session.total_objectives(),
        rage: session.rage(),
        times_caught,
        pursuers_spawned,
        pursuers_active: session.pursuers().count(),
        max_active_lights,
        path_stats: session.path_stats(),
        snapshot_hash: format!("{:016x}", session.snapshot_hash()),
    };
    println!("{}", serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?);

    Ok(())
}
