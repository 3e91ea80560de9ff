//! Actuator gateway for nvfan.
//!
//! The gateway is the only code that talks to the GPU. It exposes four
//! operations to the regulation loop (claim manual fan control, read the
//! core temperature, command a fan duty, restore automatic control) and
//! hides how they are carried out.
//!
//! # Implementations
//!
//! - [`NvidiaSettingsGateway`]: drives the `nvidia-settings` utility through a
//!   [`CommandRunner`]. The default [`SystemRunner`] bounds every invocation
//!   with a timeout so a hung utility cannot stall the control loop.
//! - [`ScriptedGateway`]: in-memory gateway that replays scripted readings and
//!   records every call. Used by the test suites.

pub mod command;
pub mod error;
pub mod gateway;
pub mod nvidia;
pub mod scripted;

pub use command::{CommandRunner, Invocation, SystemRunner};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{ActuatorGateway, GatewayTargets};
pub use nvidia::{NvidiaSettingsConfig, NvidiaSettingsGateway, parse_temperature};
pub use scripted::{GatewayCall, ScriptedGateway};
