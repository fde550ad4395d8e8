//! `turn-sim`: plays a seeded dungeon simulation on the turn scheduler.
//!
//! Configuration comes from environment variables (see
//! [`turn_runtime::SimConfig::from_env`]); a `.env` file is honoured.
//!
//! ```bash
//! SIM_SEED=7 SIM_TURNS=500 RUST_LOG=debug cargo run -p turn-runtime --bin turn-sim
//! ```

use anyhow::Result;
use turn_runtime::{SimConfig, Simulation, logging};

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    let rules = config.load_turn_system()?;
    tracing::info!(
        phases = rules.phases.len(),
        spawn_interval = rules.population.spawn_interval,
        "turn rules loaded"
    );

    let mut simulation = Simulation::new(&config, rules)?;
    let summary = simulation.run(config.turns);

    tracing::info!(
        turns = summary.turns_played,
        spawned = summary.spawned,
        removed = summary.removed,
        hostiles = summary.hostiles_remaining,
        player_alive = summary.player_alive,
        "simulation finished"
    );
    Ok(())
}
