//! Actions submitted by the input layer and the outcomes of every dispatch.

use crate::env::{CollaboratorKind, Decision};
use crate::error::{ErrorSeverity, SchedulerError};
use crate::phase::{Phase, Slot};
use crate::state::{EntityId, Position};

/// Kind of action an entity can spend a slot on.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ActionKind {
    Move,
    Attack,
    UseItem,
    Wait,
}

/// Payload carried by an [`Action`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionData {
    #[default]
    None,
    Destination(Position),
    Target(EntityId),
    Item(u32),
}

/// An externally constructed action for the entity currently addressed by
/// the active phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub actor: EntityId,
    pub data: ActionData,
    /// Opaque cost reported back to the caller; the slot economy ignores it.
    pub cost: u32,
}

impl Action {
    pub const fn new(kind: ActionKind, actor: EntityId, data: ActionData, cost: u32) -> Self {
        Self {
            kind,
            actor,
            data,
            cost,
        }
    }

    /// Converts the action into the decision handed to collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MissingData`] when the payload does not match the kind.
    pub fn decision(&self) -> Result<Decision, ActionError> {
        match (self.kind, self.data) {
            (ActionKind::Move, ActionData::Destination(position)) => Ok(Decision::Move(position)),
            (ActionKind::Attack, ActionData::Target(target)) => Ok(Decision::Attack(target)),
            (ActionKind::UseItem, ActionData::Item(item)) => Ok(Decision::UseItem(item)),
            (ActionKind::Wait, _) => Ok(Decision::Wait),
            (kind, _) => Err(ActionError::MissingData { kind }),
        }
    }
}

impl Decision {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Decision::Move(_) => ActionKind::Move,
            Decision::Attack(_) => ActionKind::Attack,
            Decision::UseItem(_) => ActionKind::UseItem,
            Decision::Wait => ActionKind::Wait,
        }
    }
}

/// Why an entity was passed over without reaching a collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    ConditionFailed,
    SlotIneligible,
    AlreadyActed,
    KindNotPermitted,
    NotTracked,
    MissingCollaborator(CollaboratorKind),
}

/// Recorded result of one dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionOutcome {
    Moved,
    Attacked,
    UsedItem,
    Waited,
    TrapTriggered,
    MoveFailed,
    AttackFailed,
    ItemFailed,
    /// Hostile move failed; the entity will be re-dispatched after the main pass.
    RetryQueued,
    /// Hostile move failed on its retry as well; the entity idles this phase.
    RetryExhausted,
    Skipped(SkipReason),
}

impl ActionOutcome {
    /// True when the outcome consumed the action slot.
    pub const fn is_success(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Moved
                | ActionOutcome::Attacked
                | ActionOutcome::UsedItem
                | ActionOutcome::Waited
        )
    }

    pub const fn is_skip(&self) -> bool {
        matches!(self, ActionOutcome::Skipped(_))
    }
}

/// Rejections of [`crate::TurnScheduler::process_action`]. No state changes
/// when one of these is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("entity {0} is not tracked by the scheduler")]
    UnknownEntity(EntityId),

    #[error("it is not entity {0}'s turn")]
    NotEntityTurn(EntityId),

    #[error("{kind} actions are not valid during {phase}")]
    PhaseDisallows { phase: Phase, kind: ActionKind },

    #[error("slot {} is not available to entity {entity}", .slot.number())]
    SlotUnavailable { entity: EntityId, slot: Slot },

    #[error("{kind} action is missing its payload")]
    MissingData { kind: ActionKind },
}

impl SchedulerError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEntity(_) => ErrorSeverity::Internal,
            Self::NotEntityTurn(_) | Self::SlotUnavailable { .. } => ErrorSeverity::Recoverable,
            Self::PhaseDisallows { .. } | Self::MissingData { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntity(_) => "ACTION_UNKNOWN_ENTITY",
            Self::NotEntityTurn(_) => "ACTION_NOT_ENTITY_TURN",
            Self::PhaseDisallows { .. } => "ACTION_PHASE_DISALLOWS",
            Self::SlotUnavailable { .. } => "ACTION_SLOT_UNAVAILABLE",
            Self::MissingData { .. } => "ACTION_MISSING_DATA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_requires_matching_payload() {
        let actor = EntityId(0);
        let step = Action::new(
            ActionKind::Move,
            actor,
            ActionData::Destination(Position::new(1, 0)),
            100,
        );
        assert_eq!(step.decision(), Ok(Decision::Move(Position::new(1, 0))));

        let bad = Action::new(ActionKind::Attack, actor, ActionData::Item(3), 100);
        assert_eq!(
            bad.decision(),
            Err(ActionError::MissingData {
                kind: ActionKind::Attack
            })
        );

        let wait = Action::new(ActionKind::Wait, actor, ActionData::None, 0);
        assert_eq!(wait.decision(), Ok(Decision::Wait));
    }

    #[test]
    fn only_slot_consuming_outcomes_are_successes() {
        assert!(ActionOutcome::Waited.is_success());
        assert!(!ActionOutcome::MoveFailed.is_success());
        assert!(!ActionOutcome::Skipped(SkipReason::SlotIneligible).is_success());
        assert!(ActionOutcome::Skipped(SkipReason::AlreadyActed).is_skip());
    }
}
