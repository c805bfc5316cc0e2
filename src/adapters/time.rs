//! Host time adapter.
//!
//! [`SystemDelay`] implements [`DelayNs`] with `std::thread::sleep`, so the
//! sequencer's waits block the session thread exactly as motor calls do.
//! A speed-up factor divides every wait; `1` is real time, `60` turns a
//! five-minute heat-up into five seconds when exercising the simulator.

use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocking delay on the system clock.
#[derive(Debug, Clone)]
pub struct SystemDelay {
    speedup: u32,
}

impl Default for SystemDelay {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SystemDelay {
    /// `speedup` of 0 is treated as 1.
    pub fn new(speedup: u32) -> Self {
        Self {
            speedup: speedup.max(1),
        }
    }

    pub fn speedup(&self) -> u32 {
        self.speedup
    }

    fn sleep(&self, wait: Duration) {
        thread::sleep(wait / self.speedup);
    }
}

impl DelayNs for SystemDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.sleep(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleep(Duration::from_millis(u64::from(ms)));
    }
}
