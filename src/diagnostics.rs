//! Light-sensor diagnostics.
//!
//! Derives two facts from the colour sensor mounted on the sensor arm:
//!
//! | Check              | Arm rotation | Channel   | True when        |
//! |--------------------|--------------|-----------|------------------|
//! | `is_iron_hot`      | 70°          | ambient   | intensity < 4    |
//! | `is_surface_clear` | 95°          | reflected | intensity <= 5   |
//!
//! The iron's heat lamp sits under the sensor at the 70° position; when it
//! is lit the sensor is shaded and reads a low ambient level. At 95° the
//! sensor looks at the cooking plate, where anything left behind reflects.
//!
//! Every probe is the same sequence: swing out, settle, read, swing back by
//! the same amount. The swing back runs even if the read failed, so the arm
//! is always at rest before the result (or the error) is returned.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::ports::{LightSensorPort, MotorPort};
use crate::config::DiagnosticsConfig;
use crate::error::{Result, SensorFault};
use crate::robot::WaffleBot;

/// Which light channel a probe reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Ambient,
    Reflected,
}

/// Stateless probe logic parameterised by thresholds and geometry.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    config: DiagnosticsConfig,
}

impl Diagnostics {
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// True when the iron's heat indicator lamp is lit.
    pub fn is_iron_hot<M, L>(&self, bot: &mut WaffleBot<M, L>, delay: &mut impl DelayNs) -> Result<bool>
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        let ambient = self.probe(bot, delay, self.config.heat_probe_degrees, Channel::Ambient)?;
        info!("Heat light ambient intensity: {}", ambient);
        Ok(ambient < self.config.hot_ambient_below)
    }

    /// True when nothing is left on the cooking surface.
    pub fn is_surface_clear<M, L>(
        &self,
        bot: &mut WaffleBot<M, L>,
        delay: &mut impl DelayNs,
    ) -> Result<bool>
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        let reflected =
            self.probe(bot, delay, self.config.surface_probe_degrees, Channel::Reflected)?;
        info!("Cooking surface reflected intensity: {}", reflected);
        Ok(reflected <= self.config.clear_reflected_max)
    }

    fn probe<M, L>(
        &self,
        bot: &mut WaffleBot<M, L>,
        delay: &mut impl DelayNs,
        degrees: u32,
        channel: Channel,
    ) -> Result<u8>
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        bot.extend_sensor_arm(degrees)?;
        delay.delay_ms(self.config.settle_ms);

        let sensor = bot.light_sensor();
        let reading = match channel {
            Channel::Ambient => sensor.ambient_light_intensity(),
            Channel::Reflected => sensor.reflected_light_intensity(),
        };

        bot.retract_sensor_arm(degrees)?;
        let reading = reading?;
        if reading > 100 {
            return Err(SensorFault::OutOfRange.into());
        }
        Ok(reading)
    }
}
