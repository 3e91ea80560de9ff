//! Error types for the nf-app layer.

use nf_gateway::GatewayError;

use crate::config::ConfigError;

/// Application error type. Each variant maps to a distinct process exit code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to claim manual fan control")]
    Claim(#[source] GatewayError),

    #[error("Regulation stopped after gateway failure")]
    Gateway(#[source] GatewayError),

    #[error("Failed to detach into the background: {0}")]
    Detach(String),

    #[error("Failed to install signal handler: {0}")]
    SignalHandler(String),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl AppError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Claim(_) => 3,
            AppError::Gateway(_) => 4,
            AppError::Detach(_) | AppError::SignalHandler(_) | AppError::Logging(_) => 1,
        }
    }
}

/// Result type for nf-app operations.
pub type AppResult<T> = Result<T, AppError>;
