//! Deterministic turn scheduling for a tile-based dungeon crawler.
//!
//! `turn-core` decides whose turn it is, how many actions each entity gets,
//! in what order, and what happens when an action fails. Everything else
//! (pathing, damage, AI choices, status effects, map generation) belongs to
//! collaborators the caller wires up through [`env::Env`].
//! [`engine::TurnScheduler`] is the entry point; its behaviour is driven by a
//! caller-supplied [`config::TurnSystemConfig`].
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod phase;
pub mod state;

pub use action::{Action, ActionData, ActionError, ActionKind, ActionOutcome, SkipReason};
pub use config::{
    ActionSlotConfig, EndTurnProcess, EndTurnStep, PhaseCondition, PhaseConfig, PopulationConfig,
    SpawnCountBand, SpeedSystemConfig, TierSlots, TurnSystemConfig,
};
pub use engine::{
    Dispatch, DispatchOrigin, EndOfTurnPipeline, EndStepReport, EndTurnOutcome, PhaseExecutor,
    PhaseReport, PopulationController, RetryQueue, SpawnReport, SpeedTierPolicy, TurnReport,
    TurnScheduler, sample_spawn_count,
};
pub use env::{
    AiPlanner, AttackOutcome, CellKind, CollaboratorError, CollaboratorKind, Combat, Decision,
    EffectProcessor, Env, Items, MoveOutcome, Movement, PcgRng, RngOracle, Room, SpawnFactory,
    Traps, World,
};
pub use error::{ConfigError, ErrorSeverity, SchedulerError};
pub use phase::{Phase, Slot};
pub use state::{
    EntityId, EntityRef, EntitySpec, EntityTurnState, Faction, PhaseEntityState, Position,
    SlotActions, SlotOverride, SlotState, SpeedOverride, SpeedTier, TurnManager,
};
