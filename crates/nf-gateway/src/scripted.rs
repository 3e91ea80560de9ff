//! In-memory gateway with scripted sensor readings.
//!
//! Every call is appended to a log so tests can assert on the exact sequence
//! of claims, reads, commands and restores.

use std::collections::VecDeque;

use nf_core::{Celsius, DutyPercent};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::ActuatorGateway;

/// A call observed by [`ScriptedGateway`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GatewayCall {
    Claim,
    ReadTemperature,
    Command(DutyPercent),
    Restore,
}

#[derive(Debug, Clone)]
enum Reading {
    Value(Celsius),
    Failure(String),
}

/// Gateway that replays scripted readings instead of touching hardware.
///
/// Once the script runs out, reads fail with [`GatewayError::Device`].
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    readings: VecDeque<Reading>,
    calls: Vec<GatewayCall>,
    claim_failure: Option<String>,
    command_failure: Option<String>,
    restore_failure: Option<String>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that will return `temperatures` in order.
    pub fn with_readings(temperatures: impl IntoIterator<Item = Celsius>) -> Self {
        let mut gateway = Self::new();
        for t in temperatures {
            gateway.push_reading(t);
        }
        gateway
    }

    pub fn push_reading(&mut self, temperature: Celsius) -> &mut Self {
        self.readings.push_back(Reading::Value(temperature));
        self
    }

    pub fn push_read_failure(&mut self, message: impl Into<String>) -> &mut Self {
        self.readings.push_back(Reading::Failure(message.into()));
        self
    }

    /// Make every claim attempt fail.
    pub fn fail_claim(mut self, message: impl Into<String>) -> Self {
        self.claim_failure = Some(message.into());
        self
    }

    /// Make every actuator command fail.
    pub fn fail_commands(mut self, message: impl Into<String>) -> Self {
        self.command_failure = Some(message.into());
        self
    }

    /// Make every restore attempt fail.
    pub fn fail_restore(mut self, message: impl Into<String>) -> Self {
        self.restore_failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> &[GatewayCall] {
        &self.calls
    }

    /// Duties passed to `command_actuator`, in call order.
    pub fn commands(&self) -> Vec<DutyPercent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Command(duty) => Some(*duty),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: GatewayCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn restore_count(&self) -> usize {
        self.count(GatewayCall::Restore)
    }

    pub fn remaining_readings(&self) -> usize {
        self.readings.len()
    }

    fn fail_with(message: &Option<String>) -> GatewayResult<()> {
        match message {
            Some(message) => Err(GatewayError::Device {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ActuatorGateway for ScriptedGateway {
    fn claim_manual_control(&mut self) -> GatewayResult<()> {
        self.calls.push(GatewayCall::Claim);
        Self::fail_with(&self.claim_failure)
    }

    fn read_temperature(&mut self) -> GatewayResult<Celsius> {
        self.calls.push(GatewayCall::ReadTemperature);
        match self.readings.pop_front() {
            Some(Reading::Value(t)) => Ok(t),
            Some(Reading::Failure(message)) => Err(GatewayError::Device { message }),
            None => Err(GatewayError::Device {
                message: "temperature script exhausted".to_string(),
            }),
        }
    }

    fn command_actuator(&mut self, duty: DutyPercent) -> GatewayResult<()> {
        self.calls.push(GatewayCall::Command(duty));
        Self::fail_with(&self.command_failure)
    }

    fn restore_automatic_control(&mut self) -> GatewayResult<()> {
        self.calls.push(GatewayCall::Restore);
        Self::fail_with(&self.restore_failure)
    }
}
