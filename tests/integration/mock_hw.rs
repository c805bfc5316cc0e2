//! Mock hardware for integration tests.
//!
//! Every motor command, sensor read, wait and emitted event lands in one
//! shared [`Journal`], so tests can assert on the full ordered history of a
//! session without a robot.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use wafflebot::app::events::AppEvent;
use wafflebot::app::ports::{
    EventSink, IndicatorPort, LightSensorPort, MotorPort, MotorState, SpeedPercent,
};
use wafflebot::config::{BotConfig, MotionConfig};
use wafflebot::error::{ActuatorFault, Error, Result};
use wafflebot::robot::{Actuator, WaffleBot};

// ── Journal ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Run {
        actuator: Actuator,
        speed: i8,
        degrees: u32,
    },
    Seek {
        actuator: Actuator,
        speed: i8,
    },
    Zero(Actuator),
    Ambient(u8),
    Reflected(u8),
    DelayMs(u32),
    Event(AppEvent),
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<HwCall>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HwCall>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, call: HwCall) {
        self.lock().push(call);
    }

    pub fn calls(&self) -> Vec<HwCall> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn count(&self, pred: impl Fn(&HwCall) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }

    /// `run_for_degrees` calls on `actuator`.
    pub fn runs(&self, actuator: Actuator) -> usize {
        self.count(|c| matches!(c, HwCall::Run { actuator: a, .. } if *a == actuator))
    }

    pub fn ambient_reads(&self) -> usize {
        self.count(|c| matches!(c, HwCall::Ambient(_)))
    }

    pub fn reflected_reads(&self) -> usize {
        self.count(|c| matches!(c, HwCall::Reflected(_)))
    }

    /// Every wait longer than `min_ms`, in order.
    pub fn delays_over(&self, min_ms: u32) -> Vec<u32> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                HwCall::DelayMs(ms) if *ms > min_ms => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                HwCall::Event(e) => Some(*e),
                _ => None,
            })
            .collect()
    }
}

// ── MockMotor ─────────────────────────────────────────────────

pub struct MockMotor {
    actuator: Actuator,
    journal: Journal,
    position: i32,
    state: MotorState,
    fail: bool,
}

impl MockMotor {
    /// A motor resting `start` degrees away from its end stop.
    pub fn new(actuator: Actuator, journal: Journal, start: i32) -> Self {
        Self {
            actuator,
            journal,
            position: start,
            state: MotorState::Idle,
            fail: false,
        }
    }

    /// A motor whose every motion command fails.
    pub fn failing(actuator: Actuator, journal: Journal) -> Self {
        Self {
            fail: true,
            ..Self::new(actuator, journal, 0)
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(Error::actuator(self.actuator, ActuatorFault::CommandFailed))
        } else {
            Ok(())
        }
    }
}

impl MotorPort for MockMotor {
    fn run_for_degrees(&mut self, speed: SpeedPercent, degrees: u32) -> Result<()> {
        self.check()?;
        self.journal.push(HwCall::Run {
            actuator: self.actuator,
            speed: speed.get(),
            degrees,
        });
        self.position += speed.direction() * degrees as i32;
        self.state = MotorState::Idle;
        Ok(())
    }

    fn run_until(&mut self, speed: SpeedPercent, stop: fn(MotorState) -> bool) -> Result<()> {
        self.check()?;
        self.journal.push(HwCall::Seek {
            actuator: self.actuator,
            speed: speed.get(),
        });
        // The end stop is reached wherever the arm happens to be.
        self.position -= self.position.abs() + 7;
        self.state = MotorState::Stalled;
        if stop(self.state) {
            Ok(())
        } else {
            Err(Error::actuator(self.actuator, ActuatorFault::StallNotReached))
        }
    }

    fn reset_position(&mut self) -> Result<()> {
        self.journal.push(HwCall::Zero(self.actuator));
        self.position = 0;
        self.state = MotorState::Idle;
        Ok(())
    }

    fn state(&self) -> Result<MotorState> {
        Ok(self.state)
    }

    fn position(&self) -> Result<i32> {
        Ok(self.position)
    }
}

// ── ScriptedLightSensor ───────────────────────────────────────

pub const HOT: u8 = 2;
pub const COLD: u8 = 12;
pub const CLEAR: u8 = 3;
pub const OBSTRUCTED: u8 = 40;

/// Serves scripted readings first, then a fixed default per channel.
pub struct ScriptedLightSensor {
    journal: Journal,
    ambient: VecDeque<u8>,
    reflected: VecDeque<u8>,
    default_ambient: u8,
    default_reflected: u8,
}

impl ScriptedLightSensor {
    /// Hot iron and a clear surface unless scripted otherwise.
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ambient: VecDeque::new(),
            reflected: VecDeque::new(),
            default_ambient: HOT,
            default_reflected: CLEAR,
        }
    }

    pub fn ambient(mut self, readings: impl IntoIterator<Item = u8>) -> Self {
        self.ambient.extend(readings);
        self
    }

    pub fn reflected(mut self, readings: impl IntoIterator<Item = u8>) -> Self {
        self.reflected.extend(readings);
        self
    }

    pub fn default_ambient(mut self, value: u8) -> Self {
        self.default_ambient = value;
        self
    }

    pub fn default_reflected(mut self, value: u8) -> Self {
        self.default_reflected = value;
        self
    }
}

impl LightSensorPort for ScriptedLightSensor {
    fn ambient_light_intensity(&mut self) -> Result<u8> {
        let v = self.ambient.pop_front().unwrap_or(self.default_ambient);
        self.journal.push(HwCall::Ambient(v));
        Ok(v)
    }

    fn reflected_light_intensity(&mut self) -> Result<u8> {
        let v = self.reflected.pop_front().unwrap_or(self.default_reflected);
        self.journal.push(HwCall::Reflected(v));
        Ok(v)
    }
}

// ── Delays ────────────────────────────────────────────────────

/// Records every wait and returns immediately.
pub struct RecordingDelay {
    journal: Journal,
    on_delay: Option<Box<dyn FnMut(u32) + Send>>,
}

impl RecordingDelay {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            on_delay: None,
        }
    }

    /// Run `hook` after every recorded wait.
    pub fn with_hook(mut self, hook: impl FnMut(u32) + Send + 'static) -> Self {
        self.on_delay = Some(Box::new(hook));
        self
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(HwCall::DelayMs(ms));
        if let Some(hook) = self.on_delay.as_mut() {
            hook(ms);
        }
    }
}

/// Parks the first wait of exactly `gate_ms` until the test releases it.
///
/// Sends on `entered` when the wait starts, then blocks on `release`.
pub struct GatedDelay {
    journal: Journal,
    gate_ms: u32,
    gated: bool,
    entered: Sender<()>,
    release: Receiver<()>,
}

impl GatedDelay {
    pub fn new(journal: Journal, gate_ms: u32, entered: Sender<()>, release: Receiver<()>) -> Self {
        Self {
            journal,
            gate_ms,
            gated: false,
            entered,
            release,
        }
    }
}

impl DelayNs for GatedDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.push(HwCall::DelayMs(ms));
        if ms == self.gate_ms && !self.gated {
            self.gated = true;
            let _ = self.entered.send(());
            let _ = self.release.recv();
        }
    }
}

// ── Sinks and indicators ──────────────────────────────────────

pub struct RecordingSink {
    journal: Journal,
}

impl RecordingSink {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.journal.push(HwCall::Event(*event));
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub states: Vec<bool>,
}

impl IndicatorPort for RecordingIndicator {
    fn set_ready(&mut self, ready: bool) {
        self.states.push(ready);
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockBot = WaffleBot<MockMotor, ScriptedLightSensor>;

/// Arm start offsets from their end stops.
pub const START_OFFSETS: [(Actuator, i32); 4] = [
    (Actuator::Lid, 35),
    (Actuator::Fork, 400),
    (Actuator::SensorArm, 12),
    (Actuator::Dispenser, 0),
];

fn start_of(actuator: Actuator) -> i32 {
    START_OFFSETS
        .iter()
        .find(|(a, _)| *a == actuator)
        .map_or(0, |(_, s)| *s)
}

pub fn mock_bot(journal: &Journal, light: ScriptedLightSensor, motion: MotionConfig) -> MockBot {
    mock_bot_failing(journal, light, motion, None)
}

/// Like [`mock_bot`], with every motion on `failing` returning an error.
pub fn mock_bot_failing(
    journal: &Journal,
    light: ScriptedLightSensor,
    motion: MotionConfig,
    failing: Option<Actuator>,
) -> MockBot {
    let motor = |actuator: Actuator| {
        if failing == Some(actuator) {
            MockMotor::failing(actuator, journal.clone())
        } else {
            MockMotor::new(actuator, journal.clone(), start_of(actuator))
        }
    };
    WaffleBot::new(
        motor(Actuator::Lid),
        motor(Actuator::Fork),
        motor(Actuator::SensorArm),
        motor(Actuator::Dispenser),
        light,
        motion,
    )
}

/// Everything a sequencer-level test needs, sharing one journal.
pub struct Rig {
    pub journal: Journal,
    pub config: BotConfig,
    pub bot: MockBot,
    pub delay: RecordingDelay,
    pub sink: RecordingSink,
}

impl Rig {
    /// Default config and a sensor built by `light`.
    pub fn new(light: impl FnOnce(ScriptedLightSensor) -> ScriptedLightSensor) -> Self {
        Self::with_config(BotConfig::default(), light)
    }

    pub fn with_config(
        config: BotConfig,
        light: impl FnOnce(ScriptedLightSensor) -> ScriptedLightSensor,
    ) -> Self {
        let journal = Journal::new();
        let sensor = light(ScriptedLightSensor::new(journal.clone()));
        Self {
            bot: mock_bot(&journal, sensor, config.motion),
            delay: RecordingDelay::new(journal.clone()),
            sink: RecordingSink::new(journal.clone()),
            journal,
            config,
        }
    }
}

/// A `makeWaffles` directive as the remote controller sends it.
pub fn make_waffles_json(desired: u32, minutes: u32, seconds: u32, dispense: u32) -> Vec<u8> {
    format!(
        r#"{{"type":"makeWaffles","desiredWaffles":{desired},"cookTimeMinutes":{minutes},"cookTimeSeconds":{seconds},"dispenseTimeSeconds":{dispense}}}"#
    )
    .into_bytes()
}
