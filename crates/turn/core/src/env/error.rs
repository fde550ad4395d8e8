use crate::error::{ErrorSeverity, SchedulerError};

/// Collaborators the scheduler can run without.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CollaboratorKind {
    Ai,
    Movement,
    Combat,
    Items,
    Traps,
    StatusEffects,
    SlipDamage,
    Hunger,
    SpawnFactory,
    Rng,
}

/// Errors raised when a collaborator is required but not configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0} collaborator is not configured")]
    Missing(CollaboratorKind),
}

impl SchedulerError for CollaboratorError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "MISSING_COLLABORATOR",
        }
    }
}
