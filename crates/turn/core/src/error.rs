//! Common error infrastructure for turn-core.
//!
//! Domain-specific errors (`ActionError`, `CollaboratorError`) live beside the
//! code that raises them; this module holds the shared severity classification
//! and the configuration errors.
//!
//! Nothing in this crate aborts an in-progress turn. Errors either reject a
//! caller request before any state changes, or are logged and degrade the
//! affected entities to a skip.

use crate::phase::Phase;

/// Severity level of an error, used for categorization and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// The same request may succeed later (different phase, collaborator wired up).
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected state inconsistency; indicates a bug in a caller or collaborator.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all turn-core errors.
pub trait SchedulerError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, suitable for log fields.
    fn error_code(&self) -> &'static str;
}

/// Errors raised while parsing or validating a [`crate::TurnSystemConfig`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown phase name '{0}'")]
    UnknownPhase(String),

    #[error("unknown phase condition '{0}'")]
    UnknownCondition(String),

    #[error("unknown end-turn process '{0}'")]
    UnknownEndTurnProcess(String),

    #[error("phase list is empty")]
    EmptyPhaseList,

    #[error("end-turn order {order} is declared more than once")]
    DuplicateEndTurnOrder { order: u32 },

    #[error("phase {phase} is listed more than once")]
    DuplicatePhase { phase: Phase },
}

impl SchedulerError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPhase(_) => "CONFIG_UNKNOWN_PHASE",
            Self::UnknownCondition(_) => "CONFIG_UNKNOWN_CONDITION",
            Self::UnknownEndTurnProcess(_) => "CONFIG_UNKNOWN_END_TURN_PROCESS",
            Self::EmptyPhaseList => "CONFIG_EMPTY_PHASE_LIST",
            Self::DuplicateEndTurnOrder { .. } => "CONFIG_DUPLICATE_END_TURN_ORDER",
            Self::DuplicatePhase { .. } => "CONFIG_DUPLICATE_PHASE",
        }
    }
}
