//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown challenge type: {0}")]
    UnknownChallengeType(String),

    #[error("Unknown subtask: {0}")]
    UnknownSubtask(String),

    #[error("Invalid challenge record: {0}")]
    InvalidChallenge(String),

    #[error("Illegal phase transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },
}

impl DomainError {
    /// Configuration errors stop the session instead of degrading a turn.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::UnknownSubtask(_))
    }
}
