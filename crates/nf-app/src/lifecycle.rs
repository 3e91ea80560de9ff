//! Process lifecycle around the regulation loop.
//!
//! Ordering:
//! 1. claim manual fan control (failure is reported to the terminal, nothing
//!    to restore)
//! 2. arm the [`RestoreGuard`]
//! 3. optionally detach into the background; only the child returns
//! 4. install the termination handler
//! 5. run the loop until a signal or a gateway failure
//! 6. restore automatic fan control, exactly once

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use nf_controls::{Pace, Pacer, StopReason, run_loop};
use nf_core::DutyPercent;
use nf_gateway::{ActuatorGateway, GatewayResult};
use nix::unistd::{ForkResult, fork};
use tracing::{error, info};

use crate::config::RegulatorSettings;
use crate::error::{AppError, AppResult};

/// Receives stop requests and paces the loop.
///
/// Waiting between cycles blocks on the channel, so a stop request cuts the
/// current interval short.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

/// Cloneable handle that requests a stop. Safe to call from a signal thread.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger(Sender<()>);

impl ShutdownTrigger {
    pub fn fire(&self) {
        // The receiver only disappears once the loop is gone.
        let _ = self.0.send(());
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn trigger(&self) -> ShutdownTrigger {
        ShutdownTrigger(self.tx.clone())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer for ShutdownSignal {
    fn wait(&mut self, interval: Duration) -> Pace {
        match self.rx.recv_timeout(interval) {
            Ok(()) => Pace::Cancelled,
            Err(RecvTimeoutError::Timeout) => Pace::Elapsed,
            // We hold a sender ourselves, so this is unreachable in practice.
            Err(RecvTimeoutError::Disconnected) => Pace::Cancelled,
        }
    }

    fn cancel_requested(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }
}

/// OS services used by the lifecycle.
pub trait Platform {
    /// Continue in a detached background process. Returns only in the
    /// process that keeps regulating.
    fn detach(&mut self) -> AppResult<()>;

    /// Route termination signals to `trigger`.
    fn install_shutdown_handler(&mut self, trigger: ShutdownTrigger) -> AppResult<()>;
}

/// Real process: `fork` for detaching, `ctrlc` for SIGINT/SIGTERM/SIGHUP.
#[derive(Debug, Default)]
pub struct OsPlatform;

impl Platform for OsPlatform {
    fn detach(&mut self) -> AppResult<()> {
        // SAFETY: called before the signal handler thread exists and while no
        // child process readers are running, so the process is single-threaded.
        match unsafe { fork() } {
            Ok(ForkResult::Child) => Ok(()),
            Ok(ForkResult::Parent { child }) => {
                info!(pid = child.as_raw(), "continuing in background");
                // The child owns the fan now; skip the parent's restore guard.
                std::process::exit(0)
            }
            Err(errno) => Err(AppError::Detach(errno.to_string())),
        }
    }

    fn install_shutdown_handler(&mut self, trigger: ShutdownTrigger) -> AppResult<()> {
        ctrlc::set_handler(move || trigger.fire())
            .map_err(|e| AppError::SignalHandler(e.to_string()))
    }
}

/// Hands the fan back to automatic control exactly once.
///
/// Call [`restore`](Self::restore) on the normal stop path to observe the
/// result. If the guard is dropped without that (early return, unwinding), the
/// restore happens in `Drop` and a failure is logged.
pub struct RestoreGuard<'a, G: ActuatorGateway + ?Sized> {
    gateway: &'a mut G,
    restored: bool,
}

impl<'a, G: ActuatorGateway + ?Sized> RestoreGuard<'a, G> {
    /// Arm the guard. The gateway must already hold manual control.
    pub fn new(gateway: &'a mut G) -> Self {
        Self {
            gateway,
            restored: false,
        }
    }

    pub fn gateway(&mut self) -> &mut G {
        &mut *self.gateway
    }

    pub fn restore(mut self) -> GatewayResult<()> {
        self.restored = true;
        self.gateway.restore_automatic_control()
    }
}

impl<G: ActuatorGateway + ?Sized> Drop for RestoreGuard<'_, G> {
    fn drop(&mut self) {
        if !self.restored {
            self.restored = true;
            if let Err(err) = self.gateway.restore_automatic_control() {
                error!(error = %err, "failed to restore automatic fan control");
            }
        }
    }
}

/// Summary of a run that ended on a stop request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub adjustments: u64,
    pub final_duty: DutyPercent,
}

/// Claim the fan, run the regulation loop, and restore automatic control.
///
/// Returns `Ok` when the loop was stopped by a termination request,
/// [`AppError::Claim`] when the fan could not be claimed (nothing is
/// restored), and [`AppError::Gateway`] when a read or command failed during
/// the loop (after restoring). A failed restore is logged and does not change
/// the result.
pub fn run_regulator<G, P>(
    settings: &RegulatorSettings,
    gateway: &mut G,
    platform: &mut P,
) -> AppResult<RunSummary>
where
    G: ActuatorGateway + ?Sized,
    P: Platform + ?Sized,
{
    let targets = &settings.gateway.targets;
    gateway.claim_manual_control().map_err(AppError::Claim)?;
    info!(gpu = %targets.gpu, fan = %targets.fan, "manual fan control claimed");

    let mut guard = RestoreGuard::new(gateway);

    if settings.daemonize {
        platform.detach()?;
    }

    let shutdown = ShutdownSignal::new();
    platform.install_shutdown_handler(shutdown.trigger())?;

    let mut regulator = settings.regulator.clone();
    info!(
        target_temp = regulator.target(),
        interval_s = settings.interval.as_secs_f64(),
        duty = %regulator.commanded(),
        "regulating"
    );
    let outcome = run_loop(&mut regulator, guard.gateway(), settings.interval, shutdown);

    match guard.restore() {
        Ok(()) => info!(gpu = %targets.gpu, "automatic fan control restored"),
        Err(err) => error!(error = %err, "failed to restore automatic fan control"),
    }

    match outcome.stop {
        StopReason::Cancelled => Ok(RunSummary {
            cycles: outcome.cycles,
            adjustments: outcome.adjustments,
            final_duty: outcome.final_duty,
        }),
        StopReason::GatewayFailure(err) => Err(AppError::Gateway(err)),
    }
}
