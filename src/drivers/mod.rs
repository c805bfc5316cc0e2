//! Actuator drivers.

pub mod motor;
