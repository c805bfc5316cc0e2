//! Per-session state owned by one `make_waffles` invocation.
//!
//! `CookSession` is created when a request starts and dropped when it ends;
//! nothing in it outlives the request.

use log::info;

use super::CookPhase;

/// Transient state of one in-progress cook request.
#[derive(Debug, Clone)]
pub struct CookSession {
    desired_waffles: u32,
    made_waffles: u32,
    phase: CookPhase,
    iron_ready: bool,
}

impl CookSession {
    pub fn new(desired_waffles: u32) -> Self {
        Self {
            desired_waffles,
            made_waffles: 0,
            phase: CookPhase::Idle,
            iron_ready: false,
        }
    }

    /// Move to `next`, logging the transition.
    pub fn enter(&mut self, next: CookPhase) {
        if next != self.phase {
            info!("Cook phase: {} -> {}", self.phase, next);
            self.phase = next;
        }
    }

    pub fn phase(&self) -> CookPhase {
        self.phase
    }

    pub fn mark_iron_ready(&mut self) {
        self.iron_ready = true;
    }

    pub fn iron_ready(&self) -> bool {
        self.iron_ready
    }

    /// Count one finished waffle.
    pub fn waffle_made(&mut self) {
        self.made_waffles += 1;
        info!(
            "Waffle {}/{} delivered",
            self.made_waffles, self.desired_waffles
        );
    }

    pub fn made_waffles(&self) -> u32 {
        self.made_waffles
    }

    pub fn wants_more(&self) -> bool {
        self.made_waffles < self.desired_waffles
    }
}
