//! Simulated tacho motor.
//!
//! Tracks a physical angle against a hard lower end stop and a reference
//! (zero) angle, the same way a large servo motor reports its position
//! relative to the last `reset` command. Reverse motion that would pass the
//! end stop is clamped there and leaves the motor `Stalled`.
//!
//! Used by the host binary so the controller can run without a robot; a
//! driver for real hardware implements the same [`MotorPort`].

use log::trace;

use crate::app::ports::{MotorPort, MotorState, SpeedPercent};
use crate::error::{ActuatorFault, Error, Result};
use crate::robot::Actuator;

pub struct SimMotor {
    actuator: Actuator,
    /// Physical angle in degrees.
    angle: i32,
    /// Physical angle that reads as position 0.
    reference: i32,
    /// Lowest reachable physical angle; `None` for free-spinning drives.
    lower_stop: Option<i32>,
    state: MotorState,
}

impl SimMotor {
    /// A motor at physical `angle` with an end stop at `lower_stop`.
    pub fn new(actuator: Actuator, angle: i32, lower_stop: Option<i32>) -> Self {
        let angle = lower_stop.map_or(angle, |stop| angle.max(stop));
        Self {
            actuator,
            angle,
            reference: 0,
            lower_stop,
            state: MotorState::Idle,
        }
    }

    pub fn actuator(&self) -> Actuator {
        self.actuator
    }

    /// Physical angle, independent of the reference.
    pub fn angle(&self) -> i32 {
        self.angle
    }

    fn travel(&mut self, delta: i32) {
        let target = self.angle.saturating_add(delta);
        match self.lower_stop {
            Some(stop) if target < stop => {
                self.angle = stop;
                self.state = MotorState::Stalled;
            }
            _ => {
                self.angle = target;
                self.state = MotorState::Idle;
            }
        }
        trace!(
            "{}: angle={} position={} state={:?}",
            self.actuator,
            self.angle,
            self.angle - self.reference,
            self.state
        );
    }
}

impl MotorPort for SimMotor {
    fn run_for_degrees(&mut self, speed: SpeedPercent, degrees: u32) -> Result<()> {
        let degrees = i32::try_from(degrees)
            .map_err(|_| Error::actuator(self.actuator, ActuatorFault::CommandFailed))?;
        self.travel(speed.direction() * degrees);
        Ok(())
    }

    fn run_until(&mut self, speed: SpeedPercent, stop: fn(MotorState) -> bool) -> Result<()> {
        self.state = MotorState::Running;
        if stop(self.state) {
            return Ok(());
        }
        match (speed.direction(), self.lower_stop) {
            (-1, Some(end)) => {
                self.travel(end - self.angle - 1);
                if stop(self.state) {
                    Ok(())
                } else {
                    Err(Error::actuator(self.actuator, ActuatorFault::StallNotReached))
                }
            }
            _ => {
                self.state = MotorState::Idle;
                Err(Error::actuator(self.actuator, ActuatorFault::StallNotReached))
            }
        }
    }

    fn reset_position(&mut self) -> Result<()> {
        self.reference = self.angle;
        self.state = MotorState::Idle;
        Ok(())
    }

    fn state(&self) -> Result<MotorState> {
        Ok(self.state)
    }

    fn position(&self) -> Result<i32> {
        Ok(self.angle - self.reference)
    }
}
