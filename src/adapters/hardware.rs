//! Hardware adapter: assembles a [`WaffleBot`] from concrete drivers.
//!
//! This is the only module that decides which motor sits on which arm.
//! The host build uses the simulated drivers; each arm starts somewhere
//! along its travel so the first reset has real work to do.

use log::info;

use crate::config::MotionConfig;
use crate::drivers::motor::SimMotor;
use crate::robot::{Actuator, WaffleBot};
use crate::sensors::light::SimLightSensor;

/// Physical angle each simulated arm powers up at, and where its end stop is.
const SIM_START: [(Actuator, i32, Option<i32>); 4] = [
    (Actuator::Lid, 40, Some(0)),
    (Actuator::Fork, 350, Some(0)),
    (Actuator::SensorArm, 25, Some(0)),
    (Actuator::Dispenser, 0, None),
];

fn sim_motor(actuator: Actuator) -> SimMotor {
    let (_, angle, stop) = SIM_START
        .iter()
        .copied()
        .find(|(a, _, _)| *a == actuator)
        .unwrap_or((actuator, 0, None));
    SimMotor::new(actuator, angle, stop)
}

/// Build a robot backed entirely by simulated drivers.
pub fn build_sim_bot(
    motion: &MotionConfig,
    light: SimLightSensor,
) -> WaffleBot<SimMotor, SimLightSensor> {
    info!("Using simulated motors and light sensor");
    WaffleBot::new(
        sim_motor(Actuator::Lid),
        sim_motor(Actuator::Fork),
        sim_motor(Actuator::SensorArm),
        sim_motor(Actuator::Dispenser),
        light,
        *motion,
    )
}
