//! Error types for gateway operations.

use std::time::Duration;

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised while reading the sensor or driving the actuator.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The helper program could not be started at all.
    #[error("Failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The helper program did not finish in time and was killed.
    #[error("`{command}` did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The helper program ran but reported failure.
    #[error("`{command}` failed ({status})")]
    CommandFailed { command: String, status: String },

    /// I/O failure while waiting for the helper or collecting its output.
    #[error("I/O error while running `{command}`")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The device answered but the temperature could not be understood.
    #[error("Unparsable temperature reading {payload:?}: {reason}")]
    Parse { payload: String, reason: String },

    /// The device rejected the request.
    #[error("Device error: {message}")]
    Device { message: String },
}

impl GatewayError {
    /// True when the device answered with something that is not a temperature,
    /// as opposed to a communication failure.
    pub fn is_parse(&self) -> bool {
        matches!(self, GatewayError::Parse { .. })
    }
}
