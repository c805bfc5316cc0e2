//! Application core: directive handling and the ports the domain talks through.
//!
//! All interaction with hardware and the remote controller happens through
//! the **port traits** defined in [`ports`], keeping the cook logic fully
//! testable without a robot.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
