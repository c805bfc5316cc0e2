//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CookSequencer / WaffleService (domain)
//! ```
//!
//! Driven adapters (motors, light sensor, event sinks, indicators, config
//! storage) implement these traits. The domain consumes them via generics,
//! so the sequencer never touches a device file directly. Timed waits go
//! through [`embedded_hal::delay::DelayNs`] so tests can run a five-minute
//! heat-up in microseconds.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BotConfig;
use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Motor value types
// ───────────────────────────────────────────────────────────────

/// Signed motor speed in percent of rated speed, always within `-100..=100`.
/// Negative values reverse the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct SpeedPercent(i8);

impl SpeedPercent {
    pub const MAX: i8 = 100;

    /// `None` when `value` is outside `-100..=100`.
    pub const fn new(value: i8) -> Option<Self> {
        if value > Self::MAX || value < -Self::MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Clamp into range.
    pub const fn saturating(value: i8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else if value < -Self::MAX {
            Self(-Self::MAX)
        } else {
            Self(value)
        }
    }

    pub const fn get(self) -> i8 {
        self.0
    }

    /// Same magnitude, opposite direction.
    pub const fn reversed(self) -> Self {
        Self(-self.0)
    }

    /// -1, 0 or 1.
    pub const fn direction(self) -> i32 {
        self.0.signum() as i32
    }
}

impl TryFrom<i8> for SpeedPercent {
    type Error = &'static str;

    fn try_from(value: i8) -> core::result::Result<Self, Self::Error> {
        Self::new(value).ok_or("speed must be within -100..=100")
    }
}

impl From<SpeedPercent> for i8 {
    fn from(speed: SpeedPercent) -> Self {
        speed.0
    }
}

impl fmt::Display for SpeedPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Controller-reported motor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Idle,
    Running,
    /// Motor is commanded but not turning.
    Stalled,
    /// Drive current limit reached.
    Overloaded,
}

impl MotorState {
    /// Stop predicate for seeking a mechanical end stop.
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Stalled | Self::Overloaded)
    }
}

// ───────────────────────────────────────────────────────────────
// Motor port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// One tacho motor. Every motion call blocks until the motion completes.
pub trait MotorPort {
    /// Rotate `degrees` at `speed`; negative speed turns the other way.
    fn run_for_degrees(&mut self, speed: SpeedPercent, degrees: u32) -> Result<()>;

    /// Run at `speed` until the reported state satisfies `stop`.
    fn run_until(&mut self, speed: SpeedPercent, stop: fn(MotorState) -> bool) -> Result<()>;

    /// Define the current physical position as zero.
    fn reset_position(&mut self) -> Result<()>;

    /// Current controller state.
    fn state(&self) -> Result<MotorState>;

    /// Accumulated rotation in degrees since the last reset.
    fn position(&self) -> Result<i32>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Colour sensor used in light-intensity modes. Both reads are on a
/// 0–100 scale and have no effect on the robot.
pub trait LightSensorPort {
    fn ambient_light_intensity(&mut self) -> Result<u8>;

    fn reflected_light_intensity(&mut self) -> Result<u8>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → remote controller)
// ───────────────────────────────────────────────────────────────

/// The domain emits [`AppEvent`](super::events::AppEvent)s through this
/// port. Delivery is fire-and-forget: implementations must not block for
/// long and never report failure back to the caller.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan an event out to two sinks.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Visual "connected and ready" indicator.
pub trait IndicatorPort {
    fn set_ready(&mut self, ready: bool);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the controller configuration.
///
/// Implementations MUST run [`BotConfig::validate`] before returning a
/// config, so a bad file never reaches the motors.
pub trait ConfigPort {
    /// Returns [`BotConfig::default()`] if no stored config exists.
    fn load(&self) -> core::result::Result<BotConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config could not be parsed.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` names the field.
    ValidationFailed(&'static str),
    /// The backing store could not be read.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
