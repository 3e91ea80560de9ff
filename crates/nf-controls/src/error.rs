//! Error types for regulator construction.

use nf_core::{CoreError, DutyPercent};
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while setting up the regulator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Initial duty lies outside the configured bounds.
    #[error("Initial duty {initial} is outside the allowed range {min}..={max}")]
    InitialOutOfBounds {
        initial: DutyPercent,
        min: DutyPercent,
        max: DutyPercent,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
