//! Grid-world simulation harness for `turn-core`.
//!
//! Provides a concrete dungeon ([`GridWorld`]), an implementation of every
//! collaborator the scheduler consumes, and a [`Simulation`] driver that owns
//! the world and the scheduler and plays whole turns. The `turn-sim` binary
//! wires these together from environment configuration.

pub mod agents;
pub mod config;
pub mod effects;
pub mod error;
pub mod logging;
pub mod rng;
pub mod simulation;
pub mod spawn;
pub mod world;

pub use agents::{ChasePlanner, GridMovement, MeleeCombat, POTION, PotionItems};
pub use config::SimConfig;
pub use effects::{HungerDecay, SlipDamage, SpikeTraps, StatusRecovery};
pub use error::{Result, SimError};
pub use rng::SeededRng;
pub use simulation::{RunSummary, Simulation};
pub use spawn::{MonsterFactory, MonsterKind};
pub use world::{Creature, GridWorld};
