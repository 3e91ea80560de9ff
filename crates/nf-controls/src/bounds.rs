//! Duty limits and quantization.

use nf_core::{DutyPercent, Real, ensure_in_range};

use crate::error::{ControlError, ControlResult};

/// Inclusive duty range the regulator may command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyBounds {
    min: DutyPercent,
    max: DutyPercent,
}

impl DutyBounds {
    pub fn new(min: DutyPercent, max: DutyPercent) -> ControlResult<Self> {
        if min > max {
            return Err(ControlError::InvalidArg {
                what: "min duty must not exceed max duty",
            });
        }
        Ok(Self { min, max })
    }

    /// Build bounds from fractional percentages.
    ///
    /// Both limits must lie in `0..=100` with `min <= max`. The lower limit is
    /// rounded up and the upper limit down, so every whole duty inside the
    /// result also lies inside the requested range.
    pub fn from_limits(min: Real, max: Real) -> ControlResult<Self> {
        let min = ensure_in_range(min, 0.0, 100.0, "min duty")?;
        let max = ensure_in_range(max, 0.0, 100.0, "max duty")?;
        if min > max {
            return Err(ControlError::InvalidArg {
                what: "min duty must not exceed max duty",
            });
        }
        let (lo, hi) = (min.ceil(), max.floor());
        if lo > hi {
            return Err(ControlError::InvalidArg {
                what: "duty range contains no whole percent",
            });
        }
        Self::new(DutyPercent::from_real(lo)?, DutyPercent::from_real(hi)?)
    }

    pub fn min(&self) -> DutyPercent {
        self.min
    }

    pub fn max(&self) -> DutyPercent {
        self.max
    }

    pub fn contains(&self, duty: DutyPercent) -> bool {
        self.min <= duty && duty <= self.max
    }

    /// Clamp a proposed duty to these bounds, then to `0..=100`, then round.
    pub fn quantize(&self, proposed: Real) -> DutyPercent {
        let clamped = proposed
            .clamp(self.min.as_real(), self.max.as_real())
            .clamp(0.0, 100.0);
        // Only NaN can fail here; park it at the floor.
        DutyPercent::from_real(clamped).unwrap_or(self.min)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn quantized_duty_is_within_bounds(
            a in 0.0_f64..=100.0,
            b in 0.0_f64..=100.0,
            proposed in -500.0_f64..500.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            if let Ok(bounds) = DutyBounds::from_limits(lo, hi) {
                let q = bounds.quantize(proposed);
                prop_assert!(bounds.contains(q));
                prop_assert!(q.as_real() >= lo && q.as_real() <= hi);
            }
        }
    }
}
