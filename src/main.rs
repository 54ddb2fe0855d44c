//! Headless runner
//!
//! Loads a data directory, places its population and runs the simulation for
//! a fixed number of ticks, printing JSON to stdout. Logs go to stderr and
//! honor `RUST_LOG`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use elemental_harmony::core::error::Result;
use elemental_harmony::ecs::world::WorldSnapshot;
use elemental_harmony::rules::loader::load_data_dir;
use elemental_harmony::simulation::population::GameOutcome;
use elemental_harmony::simulation::tick::run_simulation_tick;

/// Elemental Harmony headless runner
#[derive(Parser, Debug)]
#[command(name = "elemental-harmony")]
#[command(about = "Run the creature sandbox headless and print JSON summaries")]
struct Args {
    /// Directory holding simulation.toml, pet_rules.toml, pets.toml and elementals.toml
    #[arg(long, default_value = "data")]
    data: PathBuf,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Override the seed from simulation.toml
    #[arg(long)]
    seed: Option<u64>,

    /// Override the seconds per tick from simulation.toml
    #[arg(long)]
    dt: Option<f32>,

    /// Print a snapshot every N ticks (0 prints only the final one)
    #[arg(long, default_value_t = 0)]
    every: u64,

    /// Print every event as a JSON line
    #[arg(long)]
    events: bool,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks_run: u64,
    outcome: GameOutcome,
    event_counts: BTreeMap<String, usize>,
    final_state: WorldSnapshot,
}

fn event_name(event: &impl Serialize) -> String {
    serde_json::to_value(event)
        .ok()
        .and_then(|v| v.get("event").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("elemental_harmony=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut data = load_data_dir(&args.data)?;
    if let Some(seed) = args.seed {
        data.config.seed = seed;
    }
    if let Some(dt) = args.dt {
        data.config.tick_seconds = dt;
    }
    data.config
        .validate()
        .map_err(elemental_harmony::core::error::SimError::InvalidConfig)?;
    let seed = data.config.seed;

    let mut world = data.into_world()?;
    tracing::info!(seed, ticks = args.ticks, "simulation starting");

    let mut event_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut ticks_run = 0;
    while ticks_run < args.ticks && !world.is_over() {
        let events = run_simulation_tick(&mut world);
        ticks_run += 1;

        for event in &events {
            *event_counts.entry(event_name(event)).or_default() += 1;
            if args.events {
                println!("{}", serde_json::to_string(event)?);
            }
        }
        if args.every > 0 && ticks_run % args.every == 0 {
            println!("{}", serde_json::to_string(&world.snapshots())?);
        }
    }

    let summary = RunSummary {
        seed,
        ticks_run,
        outcome: world.population.outcome,
        event_counts,
        final_state: world.snapshots(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    tracing::info!(ticks_run, outcome = ?summary.outcome, "simulation finished");
    Ok(())
}
