//! Entity references and the scheduler-owned state attached to them.
//!
//! The world owns entities; the scheduler only holds [`EntityRef`] handles and
//! the per-entity bookkeeping in [`TurnManager`].
mod common;
mod turn;

pub use common::{EntityId, EntityRef, Faction, Position, SpeedTier};
pub use turn::{
    EntitySpec, EntityTurnState, PhaseEntityState, SlotActions, SlotOverride, SlotState,
    SpeedOverride, TurnManager,
};
