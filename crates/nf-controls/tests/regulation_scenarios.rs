//! Integration tests for the regulator and loop against a scripted gateway.

use std::time::Duration;

use nf_core::DutyPercent;
use nf_controls::{
    CycleAction, DutyBounds, Pace, Pacer, Regulator, StepPolicy, StopReason, run_loop,
};
use nf_gateway::{GatewayCall, ScriptedGateway};

fn duty(v: u8) -> DutyPercent {
    DutyPercent::new(v).unwrap()
}

fn regulator(target: f64, deadzone: f64, min: f64, max: f64, initial: u8) -> Regulator {
    Regulator::new(
        target,
        StepPolicy::new(deadzone).unwrap(),
        DutyBounds::from_limits(min, max).unwrap(),
        duty(initial),
    )
    .unwrap()
}

/// Lets a fixed number of intervals pass, then cancels.
struct CancelAfter {
    remaining: usize,
    waits: Vec<Duration>,
}

impl CancelAfter {
    fn new(elapsed_waits: usize) -> Self {
        Self {
            remaining: elapsed_waits,
            waits: Vec::new(),
        }
    }
}

impl Pacer for CancelAfter {
    fn wait(&mut self, interval: Duration) -> Pace {
        self.waits.push(interval);
        if self.remaining == 0 {
            Pace::Cancelled
        } else {
            self.remaining -= 1;
            Pace::Elapsed
        }
    }
}

#[test]
fn scenario_a_on_target_holds() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    let mut gw = ScriptedGateway::with_readings([55.0]);

    let report = reg.cycle(&mut gw).unwrap();

    assert_eq!(report.error, 0.0);
    assert_eq!(report.adjustment, 0);
    assert_eq!(report.action, CycleAction::Held);
    assert_eq!(reg.commanded(), duty(50));
    assert!(gw.commands().is_empty());
}

#[test]
fn scenario_b_moderately_hot_steps_up_five() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    let mut gw = ScriptedGateway::with_readings([62.0]);

    let report = reg.cycle(&mut gw).unwrap();

    assert_eq!(report.error, 7.0);
    assert_eq!(report.adjustment, 5);
    assert_eq!(report.action, CycleAction::Adjusted);
    assert_eq!(gw.commands(), vec![duty(55)]);
    assert_eq!(reg.commanded(), duty(55));
}

#[test]
fn scenario_c_very_hot_steps_up_ten() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    let mut gw = ScriptedGateway::with_readings([120.0]);

    let report = reg.cycle(&mut gw).unwrap();

    assert_eq!(report.adjustment, 10);
    assert_eq!(gw.commands(), vec![duty(60)]);
}

#[test]
fn scenario_d_at_floor_stays_silent() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 20);
    let mut gw = ScriptedGateway::with_readings([30.0]);

    let report = reg.cycle(&mut gw).unwrap();

    assert_eq!(report.adjustment, -10);
    assert_eq!(report.action, CycleAction::Held);
    assert_eq!(reg.commanded(), duty(20));
    assert_eq!(gw.calls(), [GatewayCall::ReadTemperature]);
}

#[test]
fn ceiling_clamps_and_then_holds() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 95);
    let mut gw = ScriptedGateway::with_readings([90.0, 90.0]);

    reg.cycle(&mut gw).unwrap();
    let second = reg.cycle(&mut gw).unwrap();

    assert_eq!(gw.commands(), vec![duty(100)]);
    assert_eq!(second.action, CycleAction::Held);
}

#[test]
fn loop_runs_until_cancelled() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    // hot, hot, on target
    let mut gw = ScriptedGateway::with_readings([62.0, 62.0, 55.0]);
    let mut pacer = CancelAfter::new(2);
    let interval = Duration::from_millis(2500);

    let outcome = run_loop(&mut reg, &mut gw, interval, &mut pacer);

    assert!(matches!(outcome.stop, StopReason::Cancelled));
    assert_eq!(outcome.cycles, 3);
    assert_eq!(outcome.adjustments, 2);
    assert_eq!(outcome.final_duty, duty(60));
    assert_eq!(gw.commands(), vec![duty(55), duty(60)]);
    assert_eq!(pacer.waits, vec![interval; 3]);
    // The loop never restores on its own.
    assert_eq!(gw.restore_count(), 0);
}

#[test]
fn loop_stops_on_first_gateway_failure() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    let mut gw = ScriptedGateway::with_readings([62.0]);
    gw.push_read_failure("nvidia-settings crashed");
    gw.push_reading(62.0);

    let outcome = run_loop(&mut reg, &mut gw, Duration::ZERO, CancelAfter::new(usize::MAX));

    match outcome.stop {
        StopReason::GatewayFailure(err) => assert!(err.to_string().contains("crashed")),
        other => panic!("unexpected stop: {other:?}"),
    }
    assert_eq!(outcome.cycles, 1);
    assert_eq!(outcome.final_duty, duty(55));
    // No retry: the reading after the failure is never consumed.
    assert_eq!(gw.remaining_readings(), 1);
}

/// Never waits; reports a stop request as already pending.
struct StopPending;

impl Pacer for StopPending {
    fn wait(&mut self, _interval: Duration) -> Pace {
        Pace::Elapsed
    }

    fn cancel_requested(&mut self) -> bool {
        true
    }
}

#[test]
fn failure_with_pending_stop_counts_as_cancelled() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    let mut gw = ScriptedGateway::with_readings([62.0]);
    gw.push_read_failure("killed by SIGINT");

    let outcome = run_loop(&mut reg, &mut gw, Duration::ZERO, StopPending);

    assert!(matches!(outcome.stop, StopReason::Cancelled));
    assert_eq!(outcome.cycles, 1);
    assert_eq!(outcome.final_duty, duty(55));
}

#[test]
fn failed_command_stops_the_loop() {
    let mut reg = regulator(55.0, 3.0, 20.0, 100.0, 50);
    let mut gw = ScriptedGateway::with_readings([80.0]).fail_commands("fan busy");

    let outcome = run_loop(&mut reg, &mut gw, Duration::ZERO, CancelAfter::new(usize::MAX));

    assert!(matches!(outcome.stop, StopReason::GatewayFailure(_)));
    assert_eq!(outcome.cycles, 0);
    assert_eq!(outcome.final_duty, duty(50));
}
