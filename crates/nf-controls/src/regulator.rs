//! Regulator state and single-cycle execution.

use nf_core::{Celsius, DutyPercent, Real, ensure_finite};
use nf_gateway::{ActuatorGateway, GatewayError, GatewayResult};

use crate::bounds::DutyBounds;
use crate::error::{ControlError, ControlResult};
use crate::policy::StepPolicy;

/// Outcome of evaluating the policy against one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// `temperature - target`; positive means too hot.
    pub error: Celsius,
    /// Signed step in percent.
    pub adjustment: i32,
    /// Duty after applying the step, clamped and rounded.
    pub proposed: DutyPercent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleAction {
    /// A new duty was sent to the fan.
    Adjusted,
    /// The proposed duty equalled the commanded one; nothing was sent.
    Held,
}

/// What one cycle observed and did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub temperature: Celsius,
    pub error: Celsius,
    pub adjustment: i32,
    /// Duty in effect after the cycle.
    pub commanded: DutyPercent,
    pub action: CycleAction,
}

/// Bounded-step fan regulator.
///
/// Owns the commanded duty, which is always a whole percent inside
/// [`DutyBounds`]. The value is assumed present on the fan at construction and
/// only changes after the gateway accepts a new command.
#[derive(Debug, Clone)]
pub struct Regulator {
    target: Celsius,
    policy: StepPolicy,
    bounds: DutyBounds,
    commanded: DutyPercent,
}

impl Regulator {
    pub fn new(
        target: Celsius,
        policy: StepPolicy,
        bounds: DutyBounds,
        initial: DutyPercent,
    ) -> ControlResult<Self> {
        let target = ensure_finite(target, "target temperature")?;
        if !bounds.contains(initial) {
            return Err(ControlError::InitialOutOfBounds {
                initial,
                min: bounds.min(),
                max: bounds.max(),
            });
        }
        Ok(Self {
            target,
            policy,
            bounds,
            commanded: initial,
        })
    }

    pub fn target(&self) -> Celsius {
        self.target
    }

    pub fn policy(&self) -> &StepPolicy {
        &self.policy
    }

    pub fn bounds(&self) -> &DutyBounds {
        &self.bounds
    }

    pub fn commanded(&self) -> DutyPercent {
        self.commanded
    }

    /// Evaluate the policy for a reading without touching any state.
    pub fn decide(&self, temperature: Celsius) -> Decision {
        let error = temperature - self.target;
        let adjustment = self.policy.calc_adjustment(error);
        let proposed = self
            .bounds
            .quantize(self.commanded.as_real() + Real::from(adjustment));
        Decision {
            error,
            adjustment,
            proposed,
        }
    }

    /// Run one sense → decide → act cycle.
    ///
    /// Gateway failures are returned as-is and leave the commanded duty
    /// untouched; the caller decides whether the loop continues.
    pub fn cycle<G: ActuatorGateway + ?Sized>(
        &mut self,
        gateway: &mut G,
    ) -> GatewayResult<CycleReport> {
        let reading = gateway.read_temperature()?;
        let temperature = ensure_finite(reading, "temperature").map_err(|e| {
            GatewayError::Parse {
                payload: reading.to_string(),
                reason: e.to_string(),
            }
        })?;

        let decision = self.decide(temperature);
        let action = if decision.proposed != self.commanded {
            gateway.command_actuator(decision.proposed)?;
            self.commanded = decision.proposed;
            CycleAction::Adjusted
        } else {
            CycleAction::Held
        };

        Ok(CycleReport {
            temperature,
            error: decision.error,
            adjustment: decision.adjustment,
            commanded: self.commanded,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_gateway::{GatewayCall, ScriptedGateway};

    fn regulator(initial: u8) -> Regulator {
        Regulator::new(
            55.0,
            StepPolicy::new(3.0).unwrap(),
            DutyBounds::from_limits(20.0, 100.0).unwrap(),
            DutyPercent::new(initial).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn decide_is_pure() {
        let reg = regulator(50);
        let d = reg.decide(62.0);
        assert_eq!(d.error, 7.0);
        assert_eq!(d.adjustment, 5);
        assert_eq!(d.proposed.get(), 55);
        assert_eq!(reg.commanded().get(), 50);
    }

    #[test]
    fn initial_duty_must_be_inside_bounds() {
        let err = Regulator::new(
            55.0,
            StepPolicy::new(3.0).unwrap(),
            DutyBounds::from_limits(20.0, 100.0).unwrap(),
            DutyPercent::new(10).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ControlError::InitialOutOfBounds { .. }));
    }

    #[test]
    fn non_finite_target_is_rejected() {
        let err = Regulator::new(
            Celsius::NAN,
            StepPolicy::new(3.0).unwrap(),
            DutyBounds::from_limits(20.0, 100.0).unwrap(),
            DutyPercent::new(50).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ControlError::Core(_)));
    }

    #[test]
    fn failed_command_keeps_previous_duty() {
        let mut reg = regulator(50);
        let mut gw = ScriptedGateway::with_readings([70.0]).fail_commands("fan busy");
        assert!(reg.cycle(&mut gw).is_err());
        assert_eq!(reg.commanded().get(), 50);
        assert_eq!(gw.count(GatewayCall::Command(DutyPercent::new(60).unwrap())), 1);
    }

    #[test]
    fn non_finite_reading_is_a_parse_failure() {
        let mut reg = regulator(50);
        let mut gw = ScriptedGateway::with_readings([Celsius::NAN]);
        let err = reg.cycle(&mut gw).unwrap_err();
        assert!(err.is_parse());
        assert!(gw.commands().is_empty());
    }
}
