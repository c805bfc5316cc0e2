//! Controller configuration parameters
//!
//! Every tunable of the WaffleBot: motion speeds and angles per actuator,
//! sensor-arm probe geometry, light thresholds, settle times and the heat
//! poll schedule. Defaults match the mechanical build the robot ships with.
//! Values can be overridden from a JSON file via
//! [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::app::ports::{ConfigError, SpeedPercent};

/// One actuator's travel: speed and angular amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmTravel {
    /// Forward speed; the return stroke uses the negated speed.
    pub speed: SpeedPercent,
    /// Rotation in degrees for one stroke.
    pub degrees: u32,
}

impl ArmTravel {
    const fn new(speed: i8, degrees: u32) -> Self {
        Self {
            speed: SpeedPercent::saturating(speed),
            degrees,
        }
    }
}

/// Reset-to-end-stop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Speed used while driving into the end stop (negative = reverse).
    pub seek_speed: SpeedPercent,
    /// Speed of the relief stroke after zeroing.
    pub relief_speed: SpeedPercent,
    /// Relief stroke for the fork arm (degrees).
    pub fork_relief_degrees: u32,
    /// Relief stroke for the sensor arm (degrees).
    pub sensor_arm_relief_degrees: u32,
    /// Relief stroke for the lid arm (degrees).
    pub lid_relief_degrees: u32,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            seek_speed: SpeedPercent::saturating(-20),
            relief_speed: SpeedPercent::saturating(20),
            fork_relief_degrees: 90,
            sensor_arm_relief_degrees: 10,
            lid_relief_degrees: 10,
        }
    }
}

/// Physical motion of every arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Lid close stroke (open is the reverse).
    pub lid: ArmTravel,
    /// Fork pickup stroke (deliver is the reverse).
    pub fork: ArmTravel,
    /// Dispenser press stroke (release is the reverse).
    pub dispenser: ArmTravel,
    /// Speed of the sensor arm when positioning for a probe.
    pub sensor_arm_speed: SpeedPercent,
    pub reset: ResetConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            lid: ArmTravel::new(20, 95),
            fork: ArmTravel::new(50, 1600),
            dispenser: ArmTravel::new(50, 140),
            sensor_arm_speed: SpeedPercent::saturating(20),
            reset: ResetConfig::default(),
        }
    }
}

/// Light-sensor probe geometry and interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Sensor-arm rotation over the heat indicator light (degrees).
    pub heat_probe_degrees: u32,
    /// Sensor-arm rotation over the cooking surface (degrees).
    pub surface_probe_degrees: u32,
    /// Wait between positioning and reading (milliseconds).
    pub settle_ms: u32,
    /// Iron is hot when ambient intensity is strictly below this.
    pub hot_ambient_below: u8,
    /// Surface is clear when reflected intensity is at most this.
    pub clear_reflected_max: u8,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            heat_probe_degrees: 70,
            surface_probe_degrees: 95,
            settle_ms: 500,
            hot_ambient_below: 4,
            clear_reflected_max: 5,
        }
    }
}

/// Cook-cycle timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookConfig {
    /// Seconds between heat checks while the iron warms up.
    pub heat_poll_interval_secs: u32,
    /// Heat checks before giving up.
    pub heat_max_attempts: u32,
    /// Seconds the batter is left to settle after dispensing.
    pub batter_settle_secs: u32,
}

impl Default for CookConfig {
    fn default() -> Self {
        Self {
            heat_poll_interval_secs: 10, // 30 x 10 s = 5 minutes
            heat_max_attempts: 30,
            batter_settle_secs: 3,
        }
    }
}

/// Core controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub motion: MotionConfig,
    pub diagnostics: DiagnosticsConfig,
    pub cook: CookConfig,
}

impl BotConfig {
    /// Range-check values that would make the robot misbehave.
    ///
    /// Speeds are already bounded by [`SpeedPercent`]; this catches zero
    /// strokes, a seek that does not reverse, and a heat schedule that
    /// could never succeed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.motion;
        for (travel, name) in [
            (m.lid, "motion.lid"),
            (m.fork, "motion.fork"),
            (m.dispenser, "motion.dispenser"),
        ] {
            if travel.degrees == 0 {
                return Err(ConfigError::ValidationFailed(name));
            }
            if travel.speed.get() == 0 {
                return Err(ConfigError::ValidationFailed(name));
            }
        }
        if m.sensor_arm_speed.get() == 0 {
            return Err(ConfigError::ValidationFailed("motion.sensor_arm_speed"));
        }
        if m.reset.seek_speed.get() >= 0 {
            return Err(ConfigError::ValidationFailed(
                "motion.reset.seek_speed must be negative",
            ));
        }
        if m.reset.relief_speed.get() <= 0 {
            return Err(ConfigError::ValidationFailed(
                "motion.reset.relief_speed must be positive",
            ));
        }

        let d = &self.diagnostics;
        if d.heat_probe_degrees == 0 || d.surface_probe_degrees == 0 {
            return Err(ConfigError::ValidationFailed("diagnostics probe degrees"));
        }
        if d.hot_ambient_below == 0 {
            return Err(ConfigError::ValidationFailed(
                "diagnostics.hot_ambient_below can never trigger",
            ));
        }
        if d.hot_ambient_below > 100 || d.clear_reflected_max > 100 {
            return Err(ConfigError::ValidationFailed("diagnostics threshold above 100"));
        }

        let c = &self.cook;
        if c.heat_poll_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("cook.heat_poll_interval_secs"));
        }
        if c.heat_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed("cook.heat_max_attempts"));
        }
        Ok(())
    }
}
