//! Unified error types for the WaffleBot controller.
//!
//! One `Error` enum that every hardware-facing subsystem converts into, so
//! the cook sequencer can treat any motor or sensor failure the same way:
//! end the session, log it, and return to idle. All variants are `Copy` so
//! they travel through the sequencer and session report without allocation.

use core::fmt;

use crate::robot::Actuator;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A motor could not be commanded or queried.
    Actuator {
        actuator: Actuator,
        fault: ActuatorFault,
    },
    /// The light sensor could not be read.
    Sensor(SensorFault),
}

impl Error {
    /// Shorthand used by motor drivers.
    pub const fn actuator(actuator: Actuator, fault: ActuatorFault) -> Self {
        Self::Actuator { actuator, fault }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator { actuator, fault } => write!(f, "actuator {actuator}: {fault}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Actuator faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorFault {
    /// The motor port has no device attached.
    NotConnected,
    /// The drive rejected the command.
    CommandFailed,
    /// A run-until-stall command reached no stall (open-ended travel).
    StallNotReached,
}

impl fmt::Display for ActuatorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "motor not connected"),
            Self::CommandFailed => write!(f, "drive command failed"),
            Self::StallNotReached => write!(f, "end stop never reached"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// The sensor did not answer.
    ReadFailed,
    /// Reading is outside the 0–100 intensity scale.
    OutOfRange,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "light sensor read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Directive validation errors
// ---------------------------------------------------------------------------

/// Reasons an inbound directive is dropped at the dispatcher boundary.
///
/// Kept apart from [`Error`]: a bad directive never reaches the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveError {
    /// Payload is not valid UTF-8 JSON.
    InvalidJson,
    /// Payload is JSON but not an object.
    NotAnObject,
    /// The `type` discriminator is absent or not a string.
    MissingType,
    /// A required field is absent.
    MissingField(&'static str),
    /// A field is present but not a usable non-negative integer.
    InvalidField(&'static str),
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "payload is not valid JSON"),
            Self::NotAnObject => write!(f, "payload is not a JSON object"),
            Self::MissingType => write!(f, "missing 'type' discriminator"),
            Self::MissingField(name) => write!(f, "missing expected parameter '{name}'"),
            Self::InvalidField(name) => write!(f, "invalid value for '{name}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
