//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are caller contract violations: they are reported immediately to the
/// caller and never leave the transcript in a half-mutated state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No assistant turn is open")]
    NoOpenTurn,

    #[error("An assistant turn is already open")]
    TurnAlreadyOpen,
}

impl DomainError {
    /// Check if this error was caused by the caller's input rather than
    /// by an ordering mistake
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DomainError::InvalidInput(_))
    }
}
