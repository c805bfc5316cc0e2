//! Cook-cycle state machine.
//!
//! ```text
//!  IDLE ──[makeWaffles]──▶ HEATING_IRON ──[hot]──────────────┐
//!                             │                              ▼
//!                        [30 cold polls]            ┌─▶ DISPENSING_BATTER
//!                             ▼                     │        │
//!                   ABORTED_HEAT_FAILURE            │        ▼
//!                                                   │     COOKING
//!                                                   │        │
//!                                                   │        ▼
//!                              [clear, more to make]└── RETRIEVING
//!                                                            │
//!                        [still obstructed]  ◀───────────────┤
//!                   ABORTED_OBSTRUCTION                      │ [all made]
//!                                                            ▼
//!                                                          IDLE
//!
//!  any phase ──[disconnect]──▶ ABORTED_DISCONNECT
//!  any phase ──[motor/sensor fault]──▶ ABORTED_FAULT
//! ```
//!
//! Unlike a tick-driven machine, each phase here is one blocking stretch of
//! motor commands and waits. [`sequencer::CookSequencer`] runs the phases
//! in order and records every transition in the session's
//! [`context::CookSession`].

pub mod context;
pub mod sequencer;

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use std::sync::Arc;

use embedded_hal::delay::DelayNs;

use crate::error::Error;

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Every phase a cook session can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookPhase {
    Idle,
    HeatingIron,
    DispensingBatter,
    Cooking,
    Retrieving,
    AbortedObstruction,
    AbortedHeatFailure,
    AbortedDisconnect,
    AbortedFault,
}

impl CookPhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::HeatingIron => "HeatingIron",
            Self::DispensingBatter => "DispensingBatter",
            Self::Cooking => "Cooking",
            Self::Retrieving => "Retrieving",
            Self::AbortedObstruction => "AbortedObstruction",
            Self::AbortedHeatFailure => "AbortedHeatFailure",
            Self::AbortedDisconnect => "AbortedDisconnect",
            Self::AbortedFault => "AbortedFault",
        }
    }

    /// Terminal phases end a session.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Idle
                | Self::AbortedObstruction
                | Self::AbortedHeatFailure
                | Self::AbortedDisconnect
                | Self::AbortedFault
        )
    }
}

impl fmt::Display for CookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Session result
// ---------------------------------------------------------------------------

/// How a cook session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookOutcome {
    /// Every requested waffle was made.
    Completed,
    /// The iron never got hot; nothing was cooked.
    HeatFailure,
    /// The surface stayed obstructed; the loop stopped early.
    Obstruction,
    /// The remote side disconnected; the session was abandoned silently.
    Disconnected,
    /// A motor or sensor could not be driven.
    Fault(Error),
}

impl CookOutcome {
    /// Terminal phase matching this outcome.
    pub fn phase(self) -> CookPhase {
        match self {
            Self::Completed => CookPhase::Idle,
            Self::HeatFailure => CookPhase::AbortedHeatFailure,
            Self::Obstruction => CookPhase::AbortedObstruction,
            Self::Disconnected => CookPhase::AbortedDisconnect,
            Self::Fault(_) => CookPhase::AbortedFault,
        }
    }
}

/// Summary returned by [`sequencer::CookSequencer::make_waffles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookReport {
    pub outcome: CookOutcome,
    pub made_waffles: u32,
}

// ---------------------------------------------------------------------------
// Abort signal
// ---------------------------------------------------------------------------

/// Shared flag raised by a disconnect and polled by the sequencer at each
/// step boundary. Waits in progress are never cut short.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Waits
// ---------------------------------------------------------------------------

/// Block for `duration` in millisecond slices that fit `DelayNs::delay_ms`.
pub(crate) fn wait(delay: &mut impl DelayNs, duration: Duration) {
    let mut remaining_ms = duration.as_millis();
    while remaining_ms > 0 {
        let chunk = remaining_ms.min(u128::from(u32::MAX)) as u32;
        delay.delay_ms(chunk);
        remaining_ms -= u128::from(chunk);
    }
}
