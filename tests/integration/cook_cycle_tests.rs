//! Cook-cycle tests: `CookSequencer` driving a mock robot end to end.

use wafflebot::app::commands::CookRequest;
use wafflebot::app::events::AppEvent;
use wafflebot::diagnostics::Diagnostics;
use wafflebot::error::{ActuatorFault, Error};
use wafflebot::fsm::sequencer::CookSequencer;
use wafflebot::fsm::{AbortSignal, CookOutcome, CookReport};
use wafflebot::robot::Actuator;

use super::mock_hw::{
    COLD, HwCall, OBSTRUCTED, RecordingDelay, Rig, ScriptedLightSensor, mock_bot_failing,
};

const POLL_MS: u32 = 10_000;

fn sequencer(rig: &Rig) -> CookSequencer {
    CookSequencer::new(rig.config.cook, Diagnostics::new(rig.config.diagnostics))
}

fn request(desired: u32) -> CookRequest {
    // 1m30s cook, 4 s dispense
    CookRequest::new(desired, 1, 30, 4).unwrap()
}

fn cook(rig: &mut Rig, abort: &AbortSignal, req: &CookRequest) -> CookReport {
    sequencer(rig).make_waffles(&mut rig.bot, &mut rig.delay, &mut rig.sink, abort, req)
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn hot_iron_makes_every_requested_waffle() {
    let mut rig = Rig::new(|s| s);
    let report = cook(&mut rig, &AbortSignal::new(), &request(3));

    assert_eq!(report.outcome, CookOutcome::Completed);
    assert_eq!(report.made_waffles, 3);
    assert!(rig.journal.events().is_empty(), "no events on a hot start");

    assert_eq!(rig.journal.ambient_reads(), 1);
    assert_eq!(rig.journal.reflected_reads(), 3);
    assert_eq!(rig.journal.runs(Actuator::Dispenser), 6);
    assert_eq!(rig.journal.runs(Actuator::Fork), 12);
    // close + open up front, then close + open per waffle
    assert_eq!(rig.journal.runs(Actuator::Lid), 8);
}

#[test]
fn each_waffle_cooks_for_one_uninterrupted_wait() {
    let mut rig = Rig::new(|s| s);
    cook(&mut rig, &AbortSignal::new(), &request(1));

    // dispense, batter settle, cook
    assert_eq!(rig.journal.delays_over(500), vec![4_000, 3_000, 90_000]);

    let calls = rig.journal.calls();
    let at = calls
        .iter()
        .position(|c| *c == HwCall::DelayMs(90_000))
        .unwrap();
    assert!(matches!(
        calls[at - 1],
        HwCall::Run { actuator: Actuator::Lid, speed, .. } if speed > 0
    ));
    assert!(matches!(
        calls[at + 1],
        HwCall::Run { actuator: Actuator::Lid, speed, .. } if speed < 0
    ));
}

#[test]
fn dispenser_is_released_after_dispense_time() {
    let mut rig = Rig::new(|s| s);
    cook(&mut rig, &AbortSignal::new(), &request(1));

    let calls = rig.journal.calls();
    let press = calls
        .iter()
        .position(|c| matches!(c, HwCall::Run { actuator: Actuator::Dispenser, speed, .. } if *speed > 0))
        .unwrap();
    assert_eq!(calls[press + 1], HwCall::DelayMs(4_000));
    assert!(matches!(
        calls[press + 2],
        HwCall::Run { actuator: Actuator::Dispenser, speed: -50, degrees: 140 }
    ));
}

// ── Heating ───────────────────────────────────────────────────

#[test]
fn cold_iron_polls_until_hot() {
    let k = 4;
    let mut rig = Rig::new(|s| s.ambient(std::iter::repeat_n(COLD, k)));
    let report = cook(&mut rig, &AbortSignal::new(), &request(1));

    assert_eq!(report.outcome, CookOutcome::Completed);
    assert_eq!(report.made_waffles, 1);
    assert_eq!(
        rig.journal.count(|c| *c == HwCall::DelayMs(POLL_MS)),
        k,
        "one poll interval before each heat check"
    );
    assert_eq!(rig.journal.ambient_reads(), k + 1);
    assert_eq!(
        rig.journal.events(),
        vec![AppEvent::HeatingStarted, AppEvent::IronReady]
    );
}

#[test]
fn iron_that_never_heats_aborts_without_cooking() {
    let mut rig = Rig::new(|s| s.default_ambient(COLD));
    let report = cook(&mut rig, &AbortSignal::new(), &request(2));

    assert_eq!(report.outcome, CookOutcome::HeatFailure);
    assert_eq!(report.made_waffles, 0);
    assert_eq!(rig.journal.ambient_reads(), 31, "initial check + 30 polls");
    assert_eq!(rig.journal.count(|c| *c == HwCall::DelayMs(POLL_MS)), 30);
    assert_eq!(
        rig.journal.events(),
        vec![AppEvent::HeatingStarted, AppEvent::HeatFailure]
    );
    assert_eq!(rig.journal.runs(Actuator::Dispenser), 0);
    assert_eq!(rig.journal.runs(Actuator::Fork), 0);
    assert_eq!(rig.journal.runs(Actuator::Lid), 1, "lid stays closed");
}

// ── Obstruction ───────────────────────────────────────────────

#[test]
fn single_obstructed_read_is_recovered() {
    let mut rig = Rig::new(|s| s.reflected([OBSTRUCTED]));
    let report = cook(&mut rig, &AbortSignal::new(), &request(1));

    assert_eq!(report.outcome, CookOutcome::Completed);
    assert_eq!(report.made_waffles, 1);
    assert_eq!(rig.journal.runs(Actuator::Fork), 8, "two extra passes");
    assert_eq!(rig.journal.reflected_reads(), 2);
    assert!(rig.journal.events().is_empty());
}

#[test]
fn persistent_obstruction_stops_the_loop() {
    let mut rig = Rig::new(|s| s.reflected([3, OBSTRUCTED, OBSTRUCTED]));
    let report = cook(&mut rig, &AbortSignal::new(), &request(3));

    assert_eq!(report.outcome, CookOutcome::Obstruction);
    assert_eq!(report.made_waffles, 1);
    assert_eq!(rig.journal.events(), vec![AppEvent::Obstruction]);
    assert_eq!(rig.journal.runs(Actuator::Fork), 4 + 8);
    assert_eq!(rig.journal.runs(Actuator::Dispenser), 4, "third waffle never dispensed");
}

// ── Faults and aborts ─────────────────────────────────────────

#[test]
fn motor_fault_ends_session_in_fault() {
    let mut rig = Rig::new(|s| s);
    rig.bot = mock_bot_failing(
        &rig.journal,
        ScriptedLightSensor::new(rig.journal.clone()),
        rig.config.motion,
        Some(Actuator::Fork),
    );
    let report = cook(&mut rig, &AbortSignal::new(), &request(2));

    assert_eq!(
        report.outcome,
        CookOutcome::Fault(Error::actuator(Actuator::Fork, ActuatorFault::CommandFailed))
    );
    assert_eq!(report.made_waffles, 0);
    assert!(rig.journal.events().is_empty());
    assert_eq!(rig.journal.reflected_reads(), 0);
}

#[test]
fn abort_during_cook_abandons_silently() {
    let abort = AbortSignal::new();
    let mut rig = Rig::new(|s| s);
    let raise = abort.clone();
    rig.delay = RecordingDelay::new(rig.journal.clone()).with_hook(move |ms| {
        if ms == 90_000 {
            raise.raise();
        }
    });
    let report = cook(&mut rig, &abort, &request(2));

    assert_eq!(report.outcome, CookOutcome::Disconnected);
    assert_eq!(report.made_waffles, 0);
    assert!(rig.journal.events().is_empty());
    assert_eq!(rig.journal.runs(Actuator::Fork), 0);
    // The cook wait itself ran to completion.
    assert_eq!(rig.journal.count(|c| *c == HwCall::DelayMs(90_000)), 1);
}

#[test]
fn abort_while_heating_sends_no_failure() {
    let abort = AbortSignal::new();
    let mut rig = Rig::new(|s| s.default_ambient(COLD));
    let raise = abort.clone();
    rig.delay = RecordingDelay::new(rig.journal.clone()).with_hook(move |ms| {
        if ms == POLL_MS {
            raise.raise();
        }
    });
    let report = cook(&mut rig, &abort, &request(1));

    assert_eq!(report.outcome, CookOutcome::Disconnected);
    assert_eq!(rig.journal.events(), vec![AppEvent::HeatingStarted]);
    assert_eq!(rig.journal.ambient_reads(), 1);
}

#[test]
fn raised_abort_prevents_any_motion() {
    let abort = AbortSignal::new();
    abort.raise();
    let mut rig = Rig::new(|s| s);
    let report = cook(&mut rig, &abort, &request(1));

    assert_eq!(report.outcome, CookOutcome::Disconnected);
    assert!(rig.journal.calls().is_empty());
}
