//! The gateway trait used by the regulation loop.

use nf_core::{Celsius, DeviceTarget, DutyPercent};

use crate::error::GatewayResult;

/// Devices addressed by a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayTargets {
    /// Sensor and fan-mode owner, e.g. `gpu:0`.
    pub gpu: DeviceTarget,
    /// Fan whose duty is commanded, e.g. `fan:0`.
    pub fan: DeviceTarget,
}

/// Sole point of contact with the temperature sensor and the fan.
///
/// Implementations are not expected to suppress redundant commands; the
/// regulator only calls [`command_actuator`](Self::command_actuator) when the
/// duty actually changes.
pub trait ActuatorGateway {
    /// Take manual ownership of the fan. Commanded duties persist until changed.
    fn claim_manual_control(&mut self) -> GatewayResult<()>;

    /// Current sensor temperature in degrees Celsius.
    fn read_temperature(&mut self) -> GatewayResult<Celsius>;

    /// Set the fan duty. Issuing the same duty twice has no further effect.
    fn command_actuator(&mut self, duty: DutyPercent) -> GatewayResult<()>;

    /// Hand the fan back to the device's automatic regulation.
    fn restore_automatic_control(&mut self) -> GatewayResult<()>;
}
