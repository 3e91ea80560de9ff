//! Inter-cycle waiting.
//!
//! The loop sleeps a plain `interval` between cycles; it does not compensate
//! for the time a cycle took, so the effective period is the interval plus
//! the gateway latency. Thermal response is slow enough for that drift not to
//! matter.

use std::time::Duration;

/// Result of waiting between two cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// The full interval passed; run the next cycle.
    Elapsed,
    /// A stop was requested; leave the loop.
    Cancelled,
}

/// Blocks the loop between cycles and reports cancellation.
pub trait Pacer {
    fn wait(&mut self, interval: Duration) -> Pace;

    /// Whether a stop request is already pending, without blocking.
    fn cancel_requested(&mut self) -> bool {
        false
    }
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn wait(&mut self, interval: Duration) -> Pace {
        (**self).wait(interval)
    }

    fn cancel_requested(&mut self) -> bool {
        (**self).cancel_requested()
    }
}
