//! Error-to-step policy.
//!
//! The step magnitude is a monotone table keyed on the absolute error:
//!
//! | `|error|` (°C)          | step (%) |
//! |-------------------------|----------|
//! | `< deadzone`            | 0        |
//! | `deadzone ..< 5`        | 2        |
//! | `5 ..< 10`              | 5        |
//! | `>= 10`                 | 10       |
//!
//! The deadzone test comes first, so a deadzone wider than 5 °C swallows the
//! lower bands. The step carries the sign of the error: too hot spins the fan
//! up, too cold slows it down.

use nf_core::{Celsius, ensure_finite};

use crate::error::{ControlError, ControlResult};

/// Lower edge of the medium band.
pub const MEDIUM_ERROR: Celsius = 5.0;
/// Lower edge of the large band.
pub const LARGE_ERROR: Celsius = 10.0;

pub const SMALL_STEP: i32 = 2;
pub const MEDIUM_STEP: i32 = 5;
pub const LARGE_STEP: i32 = 10;

/// Bounded step policy with a deadzone around the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPolicy {
    deadzone: Celsius,
}

impl StepPolicy {
    /// Create a policy. `deadzone` is the half-width of the no-correction band.
    pub fn new(deadzone: Celsius) -> ControlResult<Self> {
        let deadzone = ensure_finite(deadzone, "deadzone")?;
        if deadzone < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "deadzone must be non-negative",
            });
        }
        Ok(Self { deadzone })
    }

    pub fn deadzone(&self) -> Celsius {
        self.deadzone
    }

    /// Signed duty step (percent) for a temperature error `measured - target`.
    pub fn calc_adjustment(&self, error: Celsius) -> i32 {
        let abs_error = error.abs();
        let magnitude = if abs_error < self.deadzone {
            0
        } else if abs_error < MEDIUM_ERROR {
            SMALL_STEP
        } else if abs_error < LARGE_ERROR {
            MEDIUM_STEP
        } else {
            LARGE_STEP
        };
        // An exact hit on the target never moves the fan, even with no deadzone.
        if error > 0.0 {
            magnitude
        } else if error < 0.0 {
            -magnitude
        } else {
            0
        }
    }
}
