//! Gateway backed by the `nvidia-settings` command line utility.

use std::time::Duration;

use nf_core::{Celsius, DeviceTarget, DutyPercent, ensure_finite};
use tracing::{debug, trace};

use crate::command::{CommandRunner, Invocation, SystemRunner};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{ActuatorGateway, GatewayTargets};

const FAN_CONTROL_STATE: &str = "GPUFanControlState";
const CORE_TEMP: &str = "GPUCoreTemp";
const TARGET_FAN_SPEED: &str = "GPUTargetFanSpeed";

/// Settings for [`NvidiaSettingsGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct NvidiaSettingsConfig {
    /// Program to execute, usually `nvidia-settings`.
    pub program: String,
    pub targets: GatewayTargets,
    /// Upper bound on a single invocation.
    pub timeout: Duration,
}

/// Drives GPU fans through `nvidia-settings --assign` / `--query`.
#[derive(Debug)]
pub struct NvidiaSettingsGateway<R = SystemRunner> {
    program: String,
    targets: GatewayTargets,
    runner: R,
}

impl NvidiaSettingsGateway<SystemRunner> {
    pub fn new(config: NvidiaSettingsConfig) -> Self {
        let runner = SystemRunner::new(config.timeout);
        Self::with_runner(config.program, config.targets, runner)
    }
}

impl<R: CommandRunner> NvidiaSettingsGateway<R> {
    pub fn with_runner(program: impl Into<String>, targets: GatewayTargets, runner: R) -> Self {
        Self {
            program: program.into(),
            targets,
            runner,
        }
    }

    pub fn targets(&self) -> &GatewayTargets {
        &self.targets
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn invocation(&self, args: Vec<String>, capture_stdout: bool) -> Invocation {
        Invocation {
            program: self.program.clone(),
            args,
            capture_stdout,
        }
    }

    fn assign(&mut self, target: &DeviceTarget, attribute: &str, value: u8) -> GatewayResult<()> {
        let inv = self.invocation(
            vec![
                "--assign".to_string(),
                format!("{}/{}={}", target.bracketed(), attribute, value),
            ],
            false,
        );
        trace!(command = %inv, "assign");
        self.runner.run(&inv).map(|_| ())
    }
}

impl<R: CommandRunner> ActuatorGateway for NvidiaSettingsGateway<R> {
    fn claim_manual_control(&mut self) -> GatewayResult<()> {
        let gpu = self.targets.gpu.clone();
        self.assign(&gpu, FAN_CONTROL_STATE, 1)?;
        debug!(gpu = %gpu, "manual fan control enabled");
        Ok(())
    }

    fn read_temperature(&mut self) -> GatewayResult<Celsius> {
        let inv = self.invocation(
            vec![
                "--query".to_string(),
                format!("{}/{}", self.targets.gpu.bracketed(), CORE_TEMP),
                "--terse".to_string(),
            ],
            true,
        );
        trace!(command = %inv, "query");
        let output = self.runner.run(&inv)?;
        parse_temperature(&output)
    }

    fn command_actuator(&mut self, duty: DutyPercent) -> GatewayResult<()> {
        let fan = self.targets.fan.clone();
        self.assign(&fan, TARGET_FAN_SPEED, duty.get())
    }

    fn restore_automatic_control(&mut self) -> GatewayResult<()> {
        let gpu = self.targets.gpu.clone();
        self.assign(&gpu, FAN_CONTROL_STATE, 0)?;
        debug!(gpu = %gpu, "automatic fan control restored");
        Ok(())
    }
}

/// Parse the output of `nvidia-settings --query ... --terse`.
///
/// The payload is a single number followed by a line terminator.
pub fn parse_temperature(output: &[u8]) -> GatewayResult<Celsius> {
    let text = std::str::from_utf8(output).map_err(|e| GatewayError::Parse {
        payload: String::from_utf8_lossy(output).into_owned(),
        reason: e.to_string(),
    })?;
    let trimmed = text.trim();
    let value: Celsius = trimmed.parse().map_err(|e: std::num::ParseFloatError| {
        GatewayError::Parse {
            payload: trimmed.to_string(),
            reason: e.to_string(),
        }
    })?;
    ensure_finite(value, "temperature").map_err(|e| GatewayError::Parse {
        payload: trimmed.to_string(),
        reason: e.to_string(),
    })
}
