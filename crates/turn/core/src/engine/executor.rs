//! Execution of a single configured phase.
//!
//! Action phases select the entities of the phase's faction in turn order
//! (hostile phases re-sort them by distance to the player), filter them by the
//! phase conditions and slot eligibility, ask the AI collaborator for a
//! decision and hand it to the role collaborator. Trap phases hand every entity
//! that moved this turn, passes the phase conditions and has not yet sprung a
//! trap to the trap collaborator. Marker phases do nothing beyond being
//! recorded.

use tracing::{debug, warn};

use super::report::{DispatchOrigin, PhaseReport};
use super::retry::RetryQueue;
use super::speed::SpeedTierPolicy;
use crate::action::{ActionKind, ActionOutcome, SkipReason};
use crate::config::{PhaseCondition, PhaseConfig, TurnSystemConfig};
use crate::env::{CollaboratorError, CollaboratorKind, Decision, Env, World};
use crate::error::SchedulerError;
use crate::phase::{Phase, Slot};
use crate::state::{EntityId, EntityRef, EntityTurnState, SlotActions, SpeedTier, TurnManager};

/// Runs one phase against the scheduler's state.
///
/// Built fresh for every phase so per-phase bookkeeping (the retry queue and
/// the missing-collaborator warnings) never leaks into the next phase.
pub struct PhaseExecutor<'s> {
    config: &'s TurnSystemConfig,
    manager: &'s mut TurnManager,
    warned: Vec<CollaboratorKind>,
}

impl<'s> PhaseExecutor<'s> {
    pub fn new(config: &'s TurnSystemConfig, manager: &'s mut TurnManager) -> Self {
        Self {
            config,
            manager,
            warned: Vec::new(),
        }
    }

    fn policy(&self) -> SpeedTierPolicy<'s> {
        let config: &'s TurnSystemConfig = self.config;
        SpeedTierPolicy::new(&config.speed)
    }

    pub fn run<W: World + ?Sized>(
        &mut self,
        phase_config: &PhaseConfig,
        env: &mut Env<'_, W>,
    ) -> PhaseReport {
        let phase = phase_config.phase;
        let mut report = PhaseReport::new(phase);

        match phase {
            Phase::PlayerAction(slot) | Phase::EnemyAction(slot) | Phase::AllyAction(slot) => {
                self.run_actions(phase_config, slot, env, &mut report);
            }
            Phase::TrapProcessing(_) => self.run_traps(phase_config, env, &mut report),
            Phase::TurnStart | Phase::EndTurnRecovery | Phase::EndTurn => {
                debug!(%phase, "marker phase");
            }
        }

        report
    }

    fn run_actions<W: World + ?Sized>(
        &mut self,
        phase_config: &PhaseConfig,
        slot: Slot,
        env: &mut Env<'_, W>,
        report: &mut PhaseReport,
    ) {
        let phase = phase_config.phase;
        let mut candidates: Vec<EntityRef> = self
            .manager
            .turn_order
            .iter()
            .copied()
            .filter(|entity| Some(entity.faction) == phase.faction())
            .collect();

        if phase.is_hostile_phase() {
            sort_by_player_distance(self.manager, env.world(), &mut candidates);
        }

        let mut retry = RetryQueue::new();
        for entity in candidates {
            let outcome = self.dispatch(phase_config, slot, entity, env, &mut retry);
            debug!(%phase, entity = %entity.id, ?outcome, "dispatch");
            report.record(entity.id, outcome, DispatchOrigin::Phase);
        }

        if retry.is_empty() {
            return;
        }

        debug!(%phase, queued = retry.len(), "draining retry queue");
        for id in retry.drain() {
            let outcome = match self.manager.entity(id) {
                Some(entity) => self.dispatch(phase_config, slot, entity, env, &mut retry),
                None => ActionOutcome::Skipped(SkipReason::NotTracked),
            };
            debug!(%phase, entity = %id, ?outcome, "retry dispatch");
            report.record(id, outcome, DispatchOrigin::Retry);
        }
    }

    fn dispatch<W: World + ?Sized>(
        &mut self,
        phase_config: &PhaseConfig,
        slot: Slot,
        entity: EntityRef,
        env: &mut Env<'_, W>,
        retry: &mut RetryQueue,
    ) -> ActionOutcome {
        if let Err(reason) = admission(self.config, self.manager, phase_config, slot, entity.id) {
            return ActionOutcome::Skipped(reason);
        }

        let Some(ai) = env.ai.as_deref_mut() else {
            return self.missing(CollaboratorKind::Ai, phase_config.phase);
        };
        let decision = ai.decide(&*env.world, entity);

        self.execute(phase_config, slot, entity, decision, env, Some(retry))
    }

    /// Carries out a decision for an admitted entity and commits the slot.
    ///
    /// Without a retry queue a failed hostile move is a plain
    /// [`ActionOutcome::MoveFailed`].
    pub(crate) fn execute<W: World + ?Sized>(
        &mut self,
        phase_config: &PhaseConfig,
        slot: Slot,
        entity: EntityRef,
        decision: Decision,
        env: &mut Env<'_, W>,
        retry: Option<&mut RetryQueue>,
    ) -> ActionOutcome {
        let phase = phase_config.phase;
        let kind = decision.kind();
        let policy = self.policy();

        let Some(state) = self.manager.entity_state(entity.id) else {
            return ActionOutcome::Skipped(SkipReason::NotTracked);
        };
        if !kind_allowed(phase_config, kind) || !policy.permits(state, slot, kind) {
            debug!(%phase, entity = %entity.id, %kind, "action kind not permitted");
            return ActionOutcome::Skipped(SkipReason::KindNotPermitted);
        }

        let outcome = match decision {
            Decision::Move(_) => {
                let Some(movement) = env.movement.as_deref_mut() else {
                    return self.missing(CollaboratorKind::Movement, phase);
                };
                if movement.try_move(&mut *env.world, entity, &decision).moved {
                    ActionOutcome::Moved
                } else if !phase.is_hostile_phase() {
                    ActionOutcome::MoveFailed
                } else {
                    match retry {
                        Some(queue) if queue.was_retried(entity.id) => {
                            ActionOutcome::RetryExhausted
                        }
                        Some(queue) => {
                            queue.push(entity.id);
                            ActionOutcome::RetryQueued
                        }
                        None => ActionOutcome::MoveFailed,
                    }
                }
            }
            Decision::Attack(target) => {
                let Some(combat) = env.combat.as_deref_mut() else {
                    return self.missing(CollaboratorKind::Combat, phase);
                };
                if combat.can_attack(&*env.world, entity, target)
                    && combat.try_attack(&mut *env.world, entity, &decision).attacked
                {
                    ActionOutcome::Attacked
                } else {
                    ActionOutcome::AttackFailed
                }
            }
            Decision::UseItem(item) => {
                let Some(items) = env.items.as_deref_mut() else {
                    return self.missing(CollaboratorKind::Items, phase);
                };
                if items.use_item(&mut *env.world, entity, item) {
                    ActionOutcome::UsedItem
                } else {
                    ActionOutcome::ItemFailed
                }
            }
            Decision::Wait => ActionOutcome::Waited,
        };

        self.commit(slot, entity, outcome, env.world());
        outcome
    }

    fn commit<W: World + ?Sized>(
        &mut self,
        slot: Slot,
        entity: EntityRef,
        outcome: ActionOutcome,
        world: &W,
    ) {
        let flag = match outcome {
            ActionOutcome::Moved => Some(SlotActions::MOVED),
            ActionOutcome::Attacked => Some(SlotActions::ATTACKED),
            ActionOutcome::UsedItem => Some(SlotActions::USED_ITEM),
            ActionOutcome::Waited => Some(SlotActions::WAITED),
            _ => None,
        };

        if let Some(flag) = flag {
            if let Some(state) = self.manager.entity_state_mut(entity.id) {
                state.slot_mut(slot).actions |= flag;
            }
            if let Some(phase_state) = self.manager.phase_state_mut(entity.id) {
                phase_state.has_acted_this_phase = true;
                phase_state.has_moved_this_phase |= flag == SlotActions::MOVED;
            }
        }

        // A queued retry has not resolved slot 1 yet.
        if slot == Slot::First && outcome != ActionOutcome::RetryQueued {
            let adjacent = adjacent_to_opponent(self.manager, world, entity);
            let policy = self.policy();
            if let Some(state) = self.manager.entity_state_mut(entity.id) {
                policy.commit_slot1(state, adjacent);
            }
        }
    }

    fn run_traps<W: World + ?Sized>(
        &mut self,
        phase_config: &PhaseConfig,
        env: &mut Env<'_, W>,
        report: &mut PhaseReport,
    ) {
        let phase = phase_config.phase;
        let manager = &*self.manager;
        let moved: Vec<EntityRef> = manager
            .turn_order
            .iter()
            .copied()
            .filter(|entity| {
                manager.entity_state(entity.id).is_some_and(|state| {
                    conditions_hold(manager, phase_config, state)
                        && (state.slot1.moved() || state.slot2.moved())
                }) && manager
                    .phase_state(entity.id)
                    .is_some_and(|state| !state.trap_triggered)
            })
            .collect();

        if moved.is_empty() {
            return;
        }

        let Some(traps) = env.traps.as_deref_mut() else {
            self.missing(CollaboratorKind::Traps, phase);
            return;
        };

        for entity in moved {
            if !traps.trigger(&mut *env.world, entity) {
                continue;
            }
            if let Some(state) = self.manager.phase_state_mut(entity.id) {
                state.trap_triggered = true;
            }
            debug!(%phase, entity = %entity.id, "trap triggered");
            report.record(entity.id, ActionOutcome::TrapTriggered, DispatchOrigin::Phase);
        }
    }

    /// Logs a missing collaborator once per phase and yields the skip outcome.
    fn missing(&mut self, kind: CollaboratorKind, phase: Phase) -> ActionOutcome {
        if !self.warned.contains(&kind) {
            self.warned.push(kind);
            let error = CollaboratorError::Missing(kind);
            warn!(%phase, %error, code = error.error_code(), "skipping affected entities");
        }
        ActionOutcome::Skipped(SkipReason::MissingCollaborator(kind))
    }
}

/// Checks whether an entity may be dispatched in a phase slot, without
/// looking at the action kind.
pub(crate) fn admission(
    config: &TurnSystemConfig,
    manager: &TurnManager,
    phase_config: &PhaseConfig,
    slot: Slot,
    entity: EntityId,
) -> Result<(), SkipReason> {
    let state = manager
        .entity_state(entity)
        .ok_or(SkipReason::NotTracked)?;

    if !conditions_hold(manager, phase_config, state) {
        return Err(SkipReason::ConditionFailed);
    }
    if state.slot(slot).acted() {
        return Err(SkipReason::AlreadyActed);
    }
    if !SpeedTierPolicy::new(&config.speed).is_eligible(state, slot) {
        return Err(SkipReason::SlotIneligible);
    }
    Ok(())
}

fn conditions_hold(
    manager: &TurnManager,
    phase_config: &PhaseConfig,
    state: &EntityTurnState,
) -> bool {
    phase_config.conditions.iter().all(|condition| match condition {
        PhaseCondition::FastEntitiesOnly => state.speed_tier == SpeedTier::Fast,
        PhaseCondition::PlayerIsFast => manager
            .player()
            .and_then(|player| manager.entity_state(player.id))
            .is_some_and(|player| player.speed_tier == SpeedTier::Fast),
        PhaseCondition::ExcludeSlow => state.speed_tier != SpeedTier::Slow,
        PhaseCondition::MovementOnly => true,
    })
}

/// Whether the phase itself accepts this kind of action.
pub(crate) fn kind_allowed(phase_config: &PhaseConfig, kind: ActionKind) -> bool {
    !(phase_config.is_movement_only() && matches!(kind, ActionKind::Attack | ActionKind::UseItem))
}

/// True when a tracked entity of an opposing faction stands next to `entity`.
fn adjacent_to_opponent<W: World + ?Sized>(
    manager: &TurnManager,
    world: &W,
    entity: EntityRef,
) -> bool {
    let Some(origin) = world.position_of(entity.id) else {
        return false;
    };
    manager
        .turn_order
        .iter()
        .filter(|other| other.id != entity.id && entity.faction.opposes(other.faction))
        .filter_map(|other| world.position_of(other.id))
        .any(|position| position.is_adjacent(origin))
}

/// Stable sort by Manhattan distance to the player; entities without a
/// position go last. Leaves the order alone when there is no located player.
fn sort_by_player_distance<W: World + ?Sized>(
    manager: &TurnManager,
    world: &W,
    candidates: &mut [EntityRef],
) {
    let Some(target) = manager
        .player()
        .and_then(|player| world.position_of(player.id))
    else {
        return;
    };
    candidates.sort_by_key(|entity| {
        world
            .position_of(entity.id)
            .map_or(u32::MAX, |position| position.manhattan(target))
    });
}
