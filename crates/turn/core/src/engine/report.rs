//! Records of what the scheduler did during a turn.
//!
//! Reports are plain data built in processing order. Two runs over identical
//! inputs with deterministic collaborators produce equal reports, which is what
//! replay and regression tests compare.

use crate::action::ActionOutcome;
use crate::config::EndTurnProcess;
use crate::phase::Phase;
use crate::state::EntityId;

/// How a dispatch came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchOrigin {
    /// Main pass of the phase.
    Phase,
    /// Retry drain at the end of a hostile phase.
    Retry,
    /// Submitted through [`crate::TurnScheduler::process_action`] before the
    /// phase ran.
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub entity: EntityId,
    pub outcome: ActionOutcome,
    pub origin: DispatchOrigin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub dispatches: Vec<Dispatch>,
}

impl PhaseReport {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            dispatches: Vec::new(),
        }
    }

    pub fn record(&mut self, entity: EntityId, outcome: ActionOutcome, origin: DispatchOrigin) {
        self.dispatches.push(Dispatch {
            entity,
            outcome,
            origin,
        });
    }

    /// Outcomes recorded for one entity, in processing order.
    pub fn outcomes_for(&self, entity: EntityId) -> Vec<ActionOutcome> {
        self.dispatches
            .iter()
            .filter(|dispatch| dispatch.entity == entity)
            .map(|dispatch| dispatch.outcome)
            .collect()
    }

    /// Entities dispatched in this phase, skips excluded, in processing order.
    pub fn acting_entities(&self) -> Vec<EntityId> {
        self.dispatches
            .iter()
            .filter(|dispatch| !dispatch.outcome.is_skip())
            .map(|dispatch| dispatch.entity)
            .collect()
    }
}

/// One executed end-of-turn step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndStepReport {
    pub process: EndTurnProcess,
    /// Entities the step visited.
    pub processed: usize,
    /// True when the step's collaborator was missing and nothing ran.
    pub skipped: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// False when the tracked-hostile count had already reached the cap or a
    /// required collaborator was missing.
    pub attempted: bool,
    /// Tracked hostiles before spawning.
    pub hostiles_before: usize,
    /// Units drawn from the spawn-count distribution.
    pub requested: u32,
    pub spawned: Vec<EntityId>,
    /// Units abandoned because no eligible room or free tile was found.
    pub exhausted_units: u32,
    /// Units the spawn factory declined to create.
    pub declined_units: u32,
}

impl SpawnReport {
    pub fn skipped(hostiles_before: usize) -> Self {
        Self {
            hostiles_before,
            ..Self::default()
        }
    }
}

/// Everything one call to [`crate::TurnScheduler::execute_turn`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    /// The turn that was executed (before the counter advanced).
    pub turn: u64,
    pub phases: Vec<PhaseReport>,
    pub end_steps: Vec<EndStepReport>,
    /// Entities detached by the death check, in turn order.
    pub removed: Vec<EntityId>,
    /// Present only on turns where the spawn interval came due.
    pub spawn: Option<SpawnReport>,
}

impl TurnReport {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }

    pub fn phase_order(&self) -> Vec<Phase> {
        self.phases.iter().map(|report| report.phase).collect()
    }
}
