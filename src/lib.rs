//! WaffleBot controller library.
//!
//! Exposes the cook logic, the robot aggregate and the host adapters for
//! integration testing. The binary in `main.rs` wires the simulated
//! hardware and the line-based transport together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod robot;
pub mod sensors;
