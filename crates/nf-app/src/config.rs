//! Regulator configuration: defaults, YAML loading, validation.
//!
//! [`RegulatorConfig`] is the raw record as supplied by the command line or a
//! config file. [`RegulatorConfig::validate`] turns it into
//! [`RegulatorSettings`], the only form the lifecycle accepts, so a bad value
//! is reported before the fan is ever touched.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nf_controls::{ControlError, DutyBounds, Regulator, StepPolicy};
use nf_core::{DeviceTarget, DutyPercent};
use nf_gateway::{GatewayTargets, NvidiaSettingsConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

fn invalid(field: &'static str, value: impl Display, reason: impl Display) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Raw regulator configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegulatorConfig {
    /// Target GPU temperature in °C.
    pub target_temp: f64,
    /// Seconds between regulation cycles.
    pub regulation_interval: f64,
    /// Half-width of the no-correction band in °C.
    pub regulation_deadzone: f64,
    /// Duty assumed on the fan at startup, in percent.
    pub initial_pwm: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Fan target, e.g. `fan:0`.
    pub fan: String,
    /// GPU target, e.g. `gpu:0`.
    pub gpu: String,
    /// Fork into the background after claiming the fan.
    pub daemonize: bool,
    /// 0 = silent, 1 = log adjustments, 2 = log every cycle.
    pub verbose: u8,
    /// Program used to reach the GPU.
    pub nvidia_settings: String,
    /// Upper bound in seconds on one `nvidia-settings` invocation.
    pub command_timeout: f64,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            target_temp: 55.0,
            regulation_interval: 2.5,
            regulation_deadzone: 3.0,
            initial_pwm: 50.0,
            min_speed: 20.0,
            max_speed: 100.0,
            fan: "fan:0".to_string(),
            gpu: "gpu:0".to_string(),
            daemonize: false,
            verbose: 0,
            nvidia_settings: "nvidia-settings".to_string(),
            command_timeout: 10.0,
        }
    }
}

/// Validated settings, ready to drive the lifecycle.
#[derive(Debug, Clone)]
pub struct RegulatorSettings {
    /// Regulator in its initial state.
    pub regulator: Regulator,
    pub interval: Duration,
    pub gateway: NvidiaSettingsConfig,
    pub daemonize: bool,
    pub verbosity: u8,
}

impl RegulatorConfig {
    /// Load a YAML config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<RegulatorSettings, ConfigError> {
        if !self.target_temp.is_finite() {
            return Err(invalid("target_temp", self.target_temp, "must be finite"));
        }
        let interval = positive_duration("regulation_interval", self.regulation_interval)?;
        let command_timeout = positive_duration("command_timeout", self.command_timeout)?;

        let policy = StepPolicy::new(self.regulation_deadzone)
            .map_err(|e| invalid("regulation_deadzone", self.regulation_deadzone, e))?;

        let bounds = DutyBounds::from_limits(self.min_speed, self.max_speed).map_err(|e| {
            invalid(
                "min_speed/max_speed",
                format!("{}/{}", self.min_speed, self.max_speed),
                e,
            )
        })?;

        // Checked before rounding so 19.6 is not pulled into [20, ..].
        if !(self.min_speed..=self.max_speed).contains(&self.initial_pwm) {
            return Err(invalid(
                "initial_pwm",
                self.initial_pwm,
                format!("outside [{}, {}]", self.min_speed, self.max_speed),
            ));
        }
        let initial = DutyPercent::from_real(self.initial_pwm)
            .map_err(|e| invalid("initial_pwm", self.initial_pwm, e))?;

        let regulator =
            Regulator::new(self.target_temp, policy, bounds, initial).map_err(|e| {
                match e {
                    ControlError::InitialOutOfBounds { .. } => {
                        invalid("initial_pwm", self.initial_pwm, e)
                    }
                    other => invalid("target_temp", self.target_temp, other),
                }
            })?;

        let targets = GatewayTargets {
            gpu: DeviceTarget::new(self.gpu.as_str()).map_err(|e| invalid("gpu", &self.gpu, e))?,
            fan: DeviceTarget::new(self.fan.as_str()).map_err(|e| invalid("fan", &self.fan, e))?,
        };

        if self.nvidia_settings.trim().is_empty() {
            return Err(invalid(
                "nvidia_settings",
                &self.nvidia_settings,
                "must name a program",
            ));
        }

        Ok(RegulatorSettings {
            regulator,
            interval,
            gateway: NvidiaSettingsConfig {
                program: self.nvidia_settings.clone(),
                targets,
                timeout: command_timeout,
            },
            daemonize: self.daemonize,
            verbosity: self.verbose,
        })
    }
}

fn positive_duration(field: &'static str, seconds: f64) -> Result<Duration, ConfigError> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(invalid(field, seconds, "must be a positive number of seconds"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| invalid(field, seconds, e))
}
