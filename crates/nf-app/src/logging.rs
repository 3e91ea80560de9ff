//! Logging setup.
//!
//! Verbosity picks the default filter; `RUST_LOG` overrides it when set.
//! Cycle observations are logged at `info` (adjustments) and `debug`
//! (steady cycles), so `-v` shows adjustments and `-vv` shows every cycle.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{AppError, AppResult};

/// Default filter directive for a `-v` count.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(verbosity: u8) -> AppResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
