//! Simulated colour sensor.
//!
//! Models the two things the controller ever asks the sensor: how bright
//! the iron's heat lamp looks (ambient mode) and how much light bounces
//! off the cooking surface (reflected mode).
//!
//! | Reading   | Condition            | Value |
//! |-----------|----------------------|-------|
//! | ambient   | iron still heating   | 12    |
//! | ambient   | iron hot (lamp off)  | 2     |
//! | reflected | surface clear        | 3     |
//! | reflected | waffle left behind   | 40    |

use log::trace;

use crate::app::ports::LightSensorPort;
use crate::error::Result;

pub const AMBIENT_COLD: u8 = 12;
pub const AMBIENT_HOT: u8 = 2;
pub const REFLECTED_CLEAR: u8 = 3;
pub const REFLECTED_OBSTRUCTED: u8 = 40;

pub struct SimLightSensor {
    /// Ambient reads still to serve before the iron counts as hot.
    cold_reads_left: u32,
    obstructed: bool,
}

impl SimLightSensor {
    /// The first `hot_after` ambient reads see a cold iron. A surface that
    /// is `obstructed` never reads clear.
    pub fn new(hot_after: u32, obstructed: bool) -> Self {
        Self {
            cold_reads_left: hot_after,
            obstructed,
        }
    }

    pub fn set_obstructed(&mut self, obstructed: bool) {
        self.obstructed = obstructed;
    }
}

impl LightSensorPort for SimLightSensor {
    fn ambient_light_intensity(&mut self) -> Result<u8> {
        let value = if self.cold_reads_left > 0 {
            self.cold_reads_left -= 1;
            AMBIENT_COLD
        } else {
            AMBIENT_HOT
        };
        trace!("ambient light: {}", value);
        Ok(value)
    }

    fn reflected_light_intensity(&mut self) -> Result<u8> {
        let value = if self.obstructed {
            REFLECTED_OBSTRUCTED
        } else {
            REFLECTED_CLEAR
        };
        trace!("reflected light: {}", value);
        Ok(value)
    }
}
