//! Fan duty cycle value type.

use core::fmt;

use crate::{CoreError, Real, ensure_in_range};

/// Fan duty cycle in whole percent, always within `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DutyPercent(u8);

impl DutyPercent {
    pub const MIN: DutyPercent = DutyPercent(0);
    pub const MAX: DutyPercent = DutyPercent(100);

    pub fn new(percent: u8) -> Result<Self, CoreError> {
        if percent > Self::MAX.0 {
            return Err(CoreError::OutOfRange {
                what: "duty percent",
                value: Real::from(percent),
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(Self(percent))
    }

    /// Round a fractional percentage to the nearest whole percent.
    ///
    /// Ties round to even (50.5 -> 50, 51.5 -> 52). The value must be finite
    /// and within `0..=100` before rounding.
    pub fn from_real(percent: Real) -> Result<Self, CoreError> {
        let percent = ensure_in_range(percent, 0.0, 100.0, "duty percent")?;
        // In range, so the cast cannot truncate.
        Ok(Self(percent.round_ties_even() as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_real(self) -> Real {
        Real::from(self.0)
    }
}

impl fmt::Display for DutyPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
