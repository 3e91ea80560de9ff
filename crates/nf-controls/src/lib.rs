//! Fan regulation for nvfan.
//!
//! This crate holds the feedback policy and its execution loop. Each cycle
//! reads the GPU temperature through an [`ActuatorGateway`], turns the error
//! against the target into a coarse signed step, and commands the fan only
//! when the resulting duty differs from the one last commanded.
//!
//! # Architecture
//!
//! - [`StepPolicy`] maps a temperature error to a duty step (0, 2, 5 or 10 %)
//! - [`DutyBounds`] clamps and quantizes proposed duties
//! - [`Regulator`] owns the commanded duty and runs single cycles
//! - [`run_loop`] repeats cycles at a fixed interval until a [`Pacer`] cancels
//!   or the gateway fails
//!
//! The policy is deliberately a step table rather than a PI/PID law: the
//! deadzone absorbs sensor jitter at the cost of ripple inside the band.
//!
//! [`ActuatorGateway`]: nf_gateway::ActuatorGateway

pub mod bounds;
pub mod error;
pub mod pacing;
pub mod policy;
pub mod regulator;
pub mod runner;

pub use bounds::DutyBounds;
pub use error::{ControlError, ControlResult};
pub use pacing::{Pace, Pacer};
pub use policy::StepPolicy;
pub use regulator::{CycleAction, CycleReport, Decision, Regulator};
pub use runner::{LoopOutcome, StopReason, run_loop};
