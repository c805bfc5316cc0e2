//! The robot aggregate.
//!
//! [`WaffleBot`] owns the four motors and the light sensor and knows the
//! named strokes of each arm (open lid, pick up waffle, ...). It holds no
//! cook state; the sequencer borrows it mutably for the length of a
//! session and the reset routine borrows it between sessions.
//!
//! Arm positions are only meaningful relative to the last [`reset`]:
//! every stroke has an equal and opposite partner so an arm that went out
//! comes back to the same rest angle.
//!
//! [`reset`]: WaffleBot::reset

use core::fmt;

use log::{debug, info};

use crate::app::ports::{LightSensorPort, MotorPort, MotorState};
use crate::config::{ArmTravel, MotionConfig};
use crate::error::Result;

/// Identity of each motor on the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Lid,
    Fork,
    SensorArm,
    Dispenser,
}

impl Actuator {
    pub fn name(self) -> &'static str {
        match self {
            Self::Lid => "lid",
            Self::Fork => "fork",
            Self::SensorArm => "sensor-arm",
            Self::Dispenser => "dispenser",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position each homed arm read right after its reference was zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    pub zeroed: [(Actuator, i32); 3],
}

impl ResetReport {
    pub fn all_zero(&self) -> bool {
        self.zeroed.iter().all(|(_, pos)| *pos == 0)
    }
}

/// All motors plus the light sensor.
pub struct WaffleBot<M, L> {
    lid: M,
    fork: M,
    sensor_arm: M,
    dispenser: M,
    light: L,
    motion: MotionConfig,
}

impl<M: MotorPort, L: LightSensorPort> WaffleBot<M, L> {
    pub fn new(lid: M, fork: M, sensor_arm: M, dispenser: M, light: L, motion: MotionConfig) -> Self {
        Self {
            lid,
            fork,
            sensor_arm,
            dispenser,
            light,
            motion,
        }
    }

    pub fn motor(&self, actuator: Actuator) -> &M {
        match actuator {
            Actuator::Lid => &self.lid,
            Actuator::Fork => &self.fork,
            Actuator::SensorArm => &self.sensor_arm,
            Actuator::Dispenser => &self.dispenser,
        }
    }

    pub fn motor_mut(&mut self, actuator: Actuator) -> &mut M {
        match actuator {
            Actuator::Lid => &mut self.lid,
            Actuator::Fork => &mut self.fork,
            Actuator::SensorArm => &mut self.sensor_arm,
            Actuator::Dispenser => &mut self.dispenser,
        }
    }

    pub fn light_sensor(&mut self) -> &mut L {
        &mut self.light
    }

    pub fn motion(&self) -> &MotionConfig {
        &self.motion
    }

    // ── Named strokes ─────────────────────────────────────────

    pub fn close_lid(&mut self) -> Result<()> {
        self.stroke(Actuator::Lid, self.motion.lid, false)
    }

    pub fn open_lid(&mut self) -> Result<()> {
        self.stroke(Actuator::Lid, self.motion.lid, true)
    }

    pub fn pick_up_waffle(&mut self) -> Result<()> {
        self.stroke(Actuator::Fork, self.motion.fork, false)
    }

    pub fn deliver_waffle(&mut self) -> Result<()> {
        self.stroke(Actuator::Fork, self.motion.fork, true)
    }

    /// Press the dispenser to start the batter flowing.
    pub fn press_dispenser(&mut self) -> Result<()> {
        self.stroke(Actuator::Dispenser, self.motion.dispenser, false)
    }

    /// Release the dispenser to stop the flow.
    pub fn release_dispenser(&mut self) -> Result<()> {
        self.stroke(Actuator::Dispenser, self.motion.dispenser, true)
    }

    /// Swing the sensor arm out by `degrees` (a probe position).
    pub fn extend_sensor_arm(&mut self, degrees: u32) -> Result<()> {
        let speed = self.motion.sensor_arm_speed;
        self.sensor_arm.run_for_degrees(speed, degrees)
    }

    /// Swing the sensor arm back by `degrees`.
    pub fn retract_sensor_arm(&mut self, degrees: u32) -> Result<()> {
        let speed = self.motion.sensor_arm_speed.reversed();
        self.sensor_arm.run_for_degrees(speed, degrees)
    }

    fn stroke(&mut self, actuator: Actuator, travel: ArmTravel, reverse: bool) -> Result<()> {
        let speed = if reverse {
            travel.speed.reversed()
        } else {
            travel.speed
        };
        self.motor_mut(actuator).run_for_degrees(speed, travel.degrees)
    }

    // ── Reset ─────────────────────────────────────────────────

    /// Home the fork arm, sensor arm and lid arm.
    ///
    /// Each arm is driven into its end stop until the controller reports
    /// stalled or overloaded, zeroed there, then backed off by a relief
    /// stroke so the gearing is not left under load. The dispenser has no
    /// end stop and is not homed.
    pub fn reset(&mut self) -> Result<ResetReport> {
        info!("Resetting robot");
        let reset = self.motion.reset;
        let plan = [
            (Actuator::Fork, reset.fork_relief_degrees),
            (Actuator::SensorArm, reset.sensor_arm_relief_degrees),
            (Actuator::Lid, reset.lid_relief_degrees),
        ];
        let mut zeroed = plan.map(|(a, _)| (a, 0));

        for ((actuator, at_zero), (_, relief)) in zeroed.iter_mut().zip(plan) {
            let motor = self.motor_mut(*actuator);
            motor.run_until(reset.seek_speed, MotorState::is_blocked)?;
            motor.reset_position()?;
            *at_zero = motor.position()?;
            motor.run_for_degrees(reset.relief_speed, relief)?;
            debug!("Homed {} (zero={}, relief={}°)", actuator, at_zero, relief);
        }

        info!("Robot reset complete");
        Ok(ResetReport { zeroed })
    }
}
