//! The fixed-interval regulation loop.

use std::time::Duration;

use nf_core::DutyPercent;
use nf_gateway::{ActuatorGateway, GatewayError};
use tracing::{debug, info, warn};

use crate::pacing::{Pace, Pacer};
use crate::regulator::{CycleAction, CycleReport, Regulator};

/// Why the loop left the running state.
#[derive(Debug)]
pub enum StopReason {
    /// The pacer reported a stop request.
    Cancelled,
    /// A sensor read or actuator command failed. Not retried.
    GatewayFailure(GatewayError),
}

/// Summary of a finished loop.
#[derive(Debug)]
pub struct LoopOutcome {
    /// Cycles that completed without a gateway failure.
    pub cycles: u64,
    /// Cycles that sent a new duty to the fan.
    pub adjustments: u64,
    /// Duty in effect when the loop stopped.
    pub final_duty: DutyPercent,
    pub stop: StopReason,
}

/// Run cycles every `interval` until `pacer` cancels or the gateway fails.
///
/// The loop never restores automatic fan control itself; that is the
/// caller's job once this returns.
pub fn run_loop<G, P>(
    regulator: &mut Regulator,
    gateway: &mut G,
    interval: Duration,
    mut pacer: P,
) -> LoopOutcome
where
    G: ActuatorGateway + ?Sized,
    P: Pacer,
{
    let mut cycles = 0_u64;
    let mut adjustments = 0_u64;

    let stop = loop {
        match regulator.cycle(gateway) {
            Ok(report) => {
                cycles += 1;
                if report.action == CycleAction::Adjusted {
                    adjustments += 1;
                }
                observe(&report);
            }
            // A signal to the process group also kills the helper mid-call.
            Err(err) if pacer.cancel_requested() => {
                debug!(error = %err, cycles, "stop requested during gateway call");
                break StopReason::Cancelled;
            }
            Err(err) => {
                warn!(error = %err, "gateway failure, leaving regulation loop");
                break StopReason::GatewayFailure(err);
            }
        }

        if pacer.wait(interval) == Pace::Cancelled {
            debug!(cycles, "stop requested");
            break StopReason::Cancelled;
        }
    };

    LoopOutcome {
        cycles,
        adjustments,
        final_duty: regulator.commanded(),
        stop,
    }
}

/// Log one cycle decision. Adjustments at `info`, steady cycles at `debug`.
fn observe(report: &CycleReport) {
    match report.action {
        CycleAction::Adjusted => info!(
            "Temperature {:.0}°C, error {:+.0}°C, adjusting {:+}% PWM -> set {}",
            report.temperature, report.error, report.adjustment, report.commanded
        ),
        CycleAction::Held => debug!(
            "Temperature {:.0}°C, error {:+.0}°C, not adjusting -> remaining {}",
            report.temperature, report.error, report.commanded
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(max: Level, report: &CycleReport) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(max)
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || observe(report));
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn report(action: CycleAction, adjustment: i32, commanded: u8) -> CycleReport {
        CycleReport {
            temperature: 62.0,
            error: 7.0,
            adjustment,
            commanded: DutyPercent::new(commanded).unwrap(),
            action,
        }
    }

    #[test]
    fn adjustment_is_logged_at_info() {
        let line = logged_at(Level::INFO, &report(CycleAction::Adjusted, 5, 55));
        assert!(line.contains("INFO"), "{line}");
        assert!(
            line.contains("Temperature 62°C, error +7°C, adjusting +5% PWM -> set 55%"),
            "{line}"
        );

        assert!(logged_at(Level::WARN, &report(CycleAction::Adjusted, 5, 55)).is_empty());
    }

    #[test]
    fn steady_cycle_is_logged_at_debug_only() {
        let held = report(CycleAction::Held, 0, 100);
        assert!(logged_at(Level::INFO, &held).is_empty());

        let line = logged_at(Level::DEBUG, &held);
        assert!(line.contains("DEBUG"), "{line}");
        assert!(
            line.contains("Temperature 62°C, error +7°C, not adjusting -> remaining 100%"),
            "{line}"
        );
    }
}
