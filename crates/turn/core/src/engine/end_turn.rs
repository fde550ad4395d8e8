//! Post-turn effects run in ascending step order.

use tracing::{debug, info, warn};

use super::report::EndStepReport;
use crate::config::{EndTurnProcess, EndTurnStep};
use crate::env::{CollaboratorError, CollaboratorKind, EffectProcessor, Env, World};
use crate::error::SchedulerError;
use crate::state::{EntityId, EntityRef, TurnManager};

/// Result of one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndTurnOutcome {
    pub steps: Vec<EndStepReport>,
    pub removed: Vec<EntityId>,
}

pub struct EndOfTurnPipeline<'s> {
    steps: &'s [EndTurnStep],
    manager: &'s mut TurnManager,
}

impl<'s> EndOfTurnPipeline<'s> {
    /// `steps` must already be sorted by `order`; see
    /// [`crate::TurnSystemConfig::sorted_end_turn`].
    pub fn new(steps: &'s [EndTurnStep], manager: &'s mut TurnManager) -> Self {
        Self { steps, manager }
    }

    pub fn run<W: World + ?Sized>(&mut self, env: &mut Env<'_, W>) -> EndTurnOutcome {
        let mut outcome = EndTurnOutcome::default();

        for step in self.steps {
            let report = match step.process {
                EndTurnProcess::DeathCheck => {
                    let before = self.manager.turn_order.len();
                    self.death_check(env.world(), &mut outcome.removed);
                    EndStepReport {
                        process: step.process,
                        processed: before,
                        skipped: false,
                    }
                }
                EndTurnProcess::StatusRecovery => Self::delegate(
                    step.process,
                    CollaboratorKind::StatusEffects,
                    env.status.as_deref_mut(),
                    &mut *env.world,
                    &self.manager.turn_order,
                ),
                EndTurnProcess::SlipDamage => Self::delegate(
                    step.process,
                    CollaboratorKind::SlipDamage,
                    env.slip_damage.as_deref_mut(),
                    &mut *env.world,
                    &self.manager.turn_order,
                ),
                EndTurnProcess::HungerDecrease => Self::delegate(
                    step.process,
                    CollaboratorKind::Hunger,
                    env.hunger.as_deref_mut(),
                    &mut *env.world,
                    &self.manager.turn_order,
                ),
            };
            debug!(process = %report.process, processed = report.processed, skipped = report.skipped, "end-turn step");
            outcome.steps.push(report);
        }

        outcome
    }

    /// Detaches every tracked entity the world reports at zero health or
    /// below, or no longer knows. The world itself is left untouched.
    fn death_check<W: World + ?Sized>(&mut self, world: &W, removed: &mut Vec<EntityId>) {
        let dead: Vec<EntityId> = self
            .manager
            .turn_order
            .iter()
            .map(|entity| entity.id)
            .filter(|&id| world.health_of(id).is_none_or(|health| health <= 0))
            .collect();

        for id in dead {
            if let Some(entity) = self.manager.untrack(id) {
                info!(entity = %entity.id, faction = %entity.faction, "entity detached by death check");
                removed.push(entity.id);
            }
        }
    }

    fn delegate<'e, W: World + ?Sized>(
        process: EndTurnProcess,
        kind: CollaboratorKind,
        processor: Option<&mut (dyn EffectProcessor<W> + 'e)>,
        world: &mut W,
        entities: &[EntityRef],
    ) -> EndStepReport {
        let Some(processor) = processor else {
            let error = CollaboratorError::Missing(kind);
            warn!(%process, %error, code = error.error_code(), "skipping end-turn step");
            return EndStepReport {
                process,
                processed: 0,
                skipped: true,
            };
        };

        for &entity in entities {
            processor.process(world, entity);
        }

        EndStepReport {
            process,
            processed: entities.len(),
            skipped: false,
        }
    }
}
