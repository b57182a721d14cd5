//! Error types for dynamic-threshold secret sharing

use thiserror::Error;

/// Result type alias for secret-sharing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the sharing protocols
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested threshold is out of order with the current one or out of range
    #[error("Invalid threshold {requested}: current threshold is {current}, participants {participants}")]
    InvalidThreshold {
        requested: usize,
        current: usize,
        participants: usize,
    },

    /// Too few participants supplied to recovery
    #[error("Insufficient participants: required {required}, got {actual}")]
    InsufficientParticipants { required: usize, actual: usize },

    /// Participant index outside the configured participant list
    #[error("Invalid participant index: {0}")]
    InvalidParticipant(usize),

    /// Inverse of zero requested, i.e. two participant identifiers coincide
    #[error("Division by zero in field arithmetic")]
    DivisionByZero,

    /// Internal post-condition failed; the operation was aborted
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Operation requires `initialize` to have run first
    #[error("Engine not initialized")]
    NotInitialized,
}
