//! Application layer for nvfan.
//!
//! Turns a configuration record into a running regulator and owns the process
//! lifecycle around it: claim manual fan control, optionally detach into the
//! background, install the termination handler, run the loop, and hand the
//! fan back to automatic control exactly once on the way out.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;

// Re-export key types for convenience
pub use config::{ConfigError, RegulatorConfig, RegulatorSettings};
pub use error::{AppError, AppResult};
pub use lifecycle::{
    OsPlatform, Platform, RestoreGuard, RunSummary, ShutdownSignal, ShutdownTrigger,
    run_regulator,
};
pub use logging::init_logging;
