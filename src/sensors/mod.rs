//! Sensor drivers.
//!
//! The robot carries a single colour sensor on the sensor arm, used in its
//! two light-intensity modes; see [`light`].

pub mod light;
