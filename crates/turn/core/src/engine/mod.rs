//! Turn orchestration.
//!
//! [`TurnScheduler`] owns the [`TurnManager`] and composes the per-concern
//! components into one deterministic turn: phases in configured order through
//! [`PhaseExecutor`], then the [`EndOfTurnPipeline`], then the
//! [`PopulationController`], then the speed-tier rollover. Collaborators are
//! borrowed per call through an [`Env`], so several schedulers can run side by
//! side without sharing anything.

mod end_turn;
mod executor;
mod population;
mod report;
mod retry;
mod speed;

pub use end_turn::{EndOfTurnPipeline, EndTurnOutcome};
pub use executor::PhaseExecutor;
pub use population::{PopulationController, sample_spawn_count};
pub use report::{
    Dispatch, DispatchOrigin, EndStepReport, PhaseReport, SpawnReport, TurnReport,
};
pub use retry::RetryQueue;
pub use speed::{FALLBACK_SLOTS, SpeedTierPolicy};

use tracing::{debug, info, warn};

use crate::action::{Action, ActionData, ActionError, ActionKind, ActionOutcome};
use crate::config::{EndTurnStep, TurnSystemConfig};
use crate::env::{Env, World};
use crate::error::ConfigError;
use crate::phase::Phase;
use crate::state::{
    EntityId, EntityRef, EntitySpec, EntityTurnState, PhaseEntityState, TurnManager,
};

/// Top-level turn scheduler.
pub struct TurnScheduler {
    config: TurnSystemConfig,
    end_turn: Vec<EndTurnStep>,
    manager: TurnManager,
    completed_phases: Vec<PhaseReport>,
    external: Vec<Dispatch>,
}

impl TurnScheduler {
    /// Creates a scheduler after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by
    /// [`TurnSystemConfig::validate`].
    pub fn new(config: TurnSystemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let end_turn = config.sorted_end_turn();
        Ok(Self {
            config,
            end_turn,
            manager: TurnManager::new(),
            completed_phases: Vec::new(),
            external: Vec::new(),
        })
    }

    /// Scheduler running the stock dungeon rules.
    pub fn with_defaults() -> Self {
        let config = TurnSystemConfig::default();
        let end_turn = config.sorted_end_turn();
        Self {
            config,
            end_turn,
            manager: TurnManager::new(),
            completed_phases: Vec::new(),
            external: Vec::new(),
        }
    }

    pub fn config(&self) -> &TurnSystemConfig {
        &self.config
    }

    pub fn manager(&self) -> &TurnManager {
        &self.manager
    }

    fn policy(&self) -> SpeedTierPolicy<'_> {
        SpeedTierPolicy::new(&self.config.speed)
    }

    /// Replaces all tracked entities and starts over at turn 1.
    ///
    /// Duplicate ids keep their first spec. The resulting turn order is
    /// player, allies, hostiles, stable within each faction.
    pub fn initialize<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = EntitySpec>,
    {
        self.manager.clear();
        self.completed_phases.clear();
        self.external.clear();

        let policy = SpeedTierPolicy::new(&self.config.speed);
        for spec in entities {
            if !self.manager.track(spec.entity, policy.initial_state(&spec)) {
                warn!(entity = %spec.entity.id, "duplicate entity ignored during initialization");
            }
        }
        self.manager.sort_turn_order();

        info!(
            entities = self.manager.turn_order.len(),
            phases = self.config.phases.len(),
            "turn order initialized"
        );
    }

    /// Starts tracking one more entity. Returns false if it is already tracked.
    ///
    /// An entity added mid-turn takes part in the phases that have not run yet.
    pub fn add_entity(&mut self, spec: EntitySpec) -> bool {
        let state = self.policy().initial_state(&spec);
        if !self.manager.track(spec.entity, state) {
            return false;
        }
        self.manager.sort_turn_order();
        debug!(entity = %spec.entity.id, faction = %spec.entity.faction, "entity tracked");
        true
    }

    /// Stops tracking an entity immediately. The world is not touched.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<EntityRef> {
        let removed = self.manager.untrack(id);
        if removed.is_some() {
            debug!(entity = %id, "entity untracked");
        }
        removed
    }

    pub fn current_turn(&self) -> u64 {
        self.manager.current_turn
    }

    /// The phase that runs next, or `None` once every phase of the turn ran
    /// and only end-of-turn processing remains.
    pub fn current_phase(&self) -> Option<Phase> {
        self.config
            .phase(self.manager.current_phase_index)
            .map(|config| config.phase)
    }

    pub fn entity_state(&self, id: EntityId) -> Option<&EntityTurnState> {
        self.manager.entity_state(id)
    }

    pub fn phase_state(&self, id: EntityId) -> Option<&PhaseEntityState> {
        self.manager.phase_state(id)
    }

    /// True when the current phase would dispatch this entity: it belongs to
    /// the phase's faction, passes the phase conditions, and its slot is
    /// eligible and unused.
    pub fn is_entity_turn(&self, id: EntityId) -> bool {
        let Some(phase_config) = self.config.phase(self.manager.current_phase_index) else {
            return false;
        };
        let (Some(slot), Some(faction)) = (
            phase_config.phase.action_slot(),
            phase_config.phase.faction(),
        ) else {
            return false;
        };

        self.manager
            .entity(id)
            .is_some_and(|entity| entity.faction == faction)
            && executor::admission(&self.config, &self.manager, phase_config, slot, id).is_ok()
    }

    pub fn create_action(
        &self,
        kind: ActionKind,
        actor: EntityId,
        data: ActionData,
        cost: u32,
    ) -> Action {
        Action::new(kind, actor, data, cost)
    }

    /// Applies an externally constructed action for the entity the current
    /// phase addresses. Returns true only when the action consumed the slot.
    pub fn process_action<W: World + ?Sized>(
        &mut self,
        env: &mut Env<'_, W>,
        action: &Action,
    ) -> bool {
        match self.try_process_action(env, action) {
            Ok(outcome) => outcome.is_success(),
            Err(error) => {
                debug!(actor = %action.actor, %error, "action rejected");
                false
            }
        }
    }

    /// Like [`Self::process_action`], but reports why an action was rejected.
    ///
    /// Collaborator failures (a blocked move, a missing collaborator) are
    /// returned as outcomes, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] without changing any state when the actor is
    /// unknown, it is not the actor's turn, the phase or slot does not allow
    /// the action kind, or the payload does not match the kind.
    pub fn try_process_action<W: World + ?Sized>(
        &mut self,
        env: &mut Env<'_, W>,
        action: &Action,
    ) -> Result<ActionOutcome, ActionError> {
        let entity = self
            .manager
            .entity(action.actor)
            .ok_or(ActionError::UnknownEntity(action.actor))?;
        let decision = action.decision()?;

        let phase_config = self
            .config
            .phase(self.manager.current_phase_index)
            .ok_or(ActionError::NotEntityTurn(entity.id))?;
        let phase = phase_config.phase;
        let slot = phase
            .action_slot()
            .filter(|_| phase.faction() == Some(entity.faction))
            .ok_or(ActionError::NotEntityTurn(entity.id))?;

        executor::admission(&self.config, &self.manager, phase_config, slot, entity.id)
            .map_err(|_| ActionError::NotEntityTurn(entity.id))?;

        if !executor::kind_allowed(phase_config, action.kind) {
            return Err(ActionError::PhaseDisallows {
                phase,
                kind: action.kind,
            });
        }

        let policy = SpeedTierPolicy::new(&self.config.speed);
        let permitted = self
            .manager
            .entity_state(entity.id)
            .is_some_and(|state| policy.can_act(state, slot, action.kind));
        if !permitted {
            return Err(ActionError::SlotUnavailable {
                entity: entity.id,
                slot,
            });
        }

        let outcome = PhaseExecutor::new(&self.config, &mut self.manager)
            .execute(phase_config, slot, entity, decision, env, None);
        debug!(%phase, entity = %entity.id, ?outcome, "external action");
        self.external.push(Dispatch {
            entity: entity.id,
            outcome,
            origin: DispatchOrigin::External,
        });
        Ok(outcome)
    }

    /// Runs the phase at the current index and advances the index.
    ///
    /// Returns `None` when every phase of this turn has already run.
    pub fn run_next_phase<W: World + ?Sized>(&mut self, env: &mut Env<'_, W>) -> Option<PhaseReport> {
        let index = self.manager.current_phase_index;
        let phase_config = self.config.phase(index)?;

        let mut report = PhaseExecutor::new(&self.config, &mut self.manager).run(phase_config, env);
        if !self.external.is_empty() {
            let mut dispatches = std::mem::take(&mut self.external);
            dispatches.append(&mut report.dispatches);
            report.dispatches = dispatches;
        }

        self.manager.current_phase_index += 1;
        self.completed_phases.push(report.clone());
        Some(report)
    }

    /// Runs every phase that has not run yet this turn, then end-of-turn
    /// processing and natural spawning, and advances to the next turn.
    pub fn execute_turn<W: World + ?Sized>(&mut self, env: &mut Env<'_, W>) -> TurnReport {
        while self.run_next_phase(env).is_some() {}

        let turn = self.manager.current_turn;
        let end = EndOfTurnPipeline::new(&self.end_turn, &mut self.manager).run(env);
        let spawn = PopulationController::new(&self.config, &mut self.manager).run(env);

        self.advance_turn();

        let report = TurnReport {
            turn,
            phases: std::mem::take(&mut self.completed_phases),
            end_steps: end.steps,
            removed: end.removed,
            spawn,
        };
        info!(
            turn,
            tracked = self.manager.turn_order.len(),
            removed = report.removed.len(),
            spawned = report.spawn.as_ref().map_or(0, |spawn| spawn.spawned.len()),
            "turn complete"
        );
        report
    }

    fn advance_turn(&mut self) {
        let policy = SpeedTierPolicy::new(&self.config.speed);
        for entity in &self.manager.turn_order {
            if let Some(state) = self.manager.entity_states.get_mut(&entity.id) {
                policy.advance_turn(state);
            }
        }
        self.manager.reset_phase_states();
        self.manager.current_turn += 1;
        self.manager.current_phase_index = 0;
        self.external.clear();
    }
}
