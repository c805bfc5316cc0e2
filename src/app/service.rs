//! Application service: the hexagonal core and the command dispatcher.
//!
//! [`WaffleService`] owns the robot (behind a mutex), the cook sequencer
//! and the session bookkeeping. It is the only way to start a cook cycle
//! and the only place connection lifecycle events land.
//!
//! ```text
//!  directive ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                │     WaffleService       │
//!  connect    ──▶│  session claim · lock   │ ──▶ WaffleBot (motors, sensor)
//!  disconnect ──▶│  CookSequencer · reset  │
//!                └────────────────────────┘
//! ```
//!
//! ## Serialisation
//!
//! - A `makeWaffles` directive first claims the session flag. If another
//!   session holds it the directive is dropped, not queued.
//! - The robot lock is held for a whole session and for a whole reset, so
//!   a reset never interleaves with cook-loop motor commands.
//! - A disconnect raises the abort signal *before* taking the lock; the
//!   running session notices at its next step boundary and releases it.
//! - Cook requests are only accepted once a reset has completed. A failed
//!   reset or a session that ends in a fault clears the homed flag until
//!   the next successful reset.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::BotConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::fsm::sequencer::CookSequencer;
use crate::fsm::{AbortSignal, CookOutcome, CookReport};
use crate::robot::{ResetReport, WaffleBot};

use super::commands::Directive;
use super::ports::{EventSink, IndicatorPort, LightSensorPort, MotorPort};

/// Everything the robot lock protects: the bot itself, the clock its waits
/// run on, and the sink its events go to.
pub struct Station<M, L, D, E> {
    pub bot: WaffleBot<M, L>,
    pub delay: D,
    pub sink: E,
}

/// RAII claim on the single cook session.
struct SessionClaim<'a>(&'a AtomicBool);

impl<'a> SessionClaim<'a> {
    fn try_claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SessionClaim<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The application service.
pub struct WaffleService<M, L, D, E> {
    sequencer: CookSequencer,
    station: Mutex<Station<M, L, D, E>>,
    session_active: AtomicBool,
    /// Set by a completed reset; written only while the station lock is held.
    homed: AtomicBool,
    abort: AbortSignal,
}

impl<M, L, D, E> WaffleService<M, L, D, E>
where
    M: MotorPort,
    L: LightSensorPort,
    D: DelayNs,
    E: EventSink,
{
    pub fn new(config: &BotConfig, station: Station<M, L, D, E>) -> Self {
        let diagnostics = Diagnostics::new(config.diagnostics);
        Self {
            sequencer: CookSequencer::new(config.cook, diagnostics),
            station: Mutex::new(station),
            session_active: AtomicBool::new(false),
            homed: AtomicBool::new(false),
            abort: AbortSignal::new(),
        }
    }

    // ── Directives ────────────────────────────────────────────

    /// Handle one raw directive from the remote controller.
    ///
    /// Malformed directives and unknown types are logged and dropped;
    /// a `makeWaffles` arriving while a session runs, or before the robot
    /// has been homed, is dropped too.
    /// Returns the session report when a cook cycle actually ran.
    pub fn handle_directive(&self, raw: &[u8]) -> Option<CookReport> {
        let request = match Directive::parse(raw) {
            Ok(Directive::MakeWaffles(request)) => request,
            Ok(Directive::Ignored(kind)) => {
                debug!("Ignoring directive type '{}'", kind);
                return None;
            }
            Err(e) => {
                warn!(
                    "Dropping directive ({}): {}",
                    e,
                    String::from_utf8_lossy(raw)
                );
                return None;
            }
        };

        let Some(_claim) = SessionClaim::try_claim(&self.session_active) else {
            warn!("Cook session already active, dropping makeWaffles directive");
            return None;
        };

        let mut station = self.lock_station();
        if !self.is_homed() {
            warn!("Robot not homed, dropping makeWaffles directive until the next reset");
            return None;
        }
        let Station { bot, delay, sink } = &mut *station;
        let report = self
            .sequencer
            .make_waffles(bot, delay, sink, &self.abort, &request);
        if let CookOutcome::Fault(e) = report.outcome {
            warn!("Arm positions untrusted after fault ({}), reset required", e);
            self.homed.store(false, Ordering::Release);
        }

        info!(
            "Cook session finished: {:?}, {} waffle(s) made",
            report.outcome, report.made_waffles
        );
        Some(report)
    }

    // ── Connection lifecycle ──────────────────────────────────

    /// The remote controller connected: light the ready indicator and
    /// home the robot.
    pub fn on_connected(
        &self,
        device_address: &str,
        indicator: &mut impl IndicatorPort,
    ) -> Result<ResetReport> {
        indicator.set_ready(true);
        info!("Connected to {}", device_address);
        let mut station = self.lock_station();
        self.home(&mut station)
    }

    /// The remote controller disconnected: stop any running session, home
    /// the robot and clear the ready indicator. No event is sent for the
    /// abandoned session.
    pub fn on_disconnected(
        &self,
        device_address: &str,
        indicator: &mut impl IndicatorPort,
    ) -> Result<ResetReport> {
        self.abort.raise();
        let result = {
            let mut station = self.lock_station();
            let result = self.home(&mut station);
            self.abort.clear();
            result
        };
        indicator.set_ready(false);
        info!("Disconnected from {}", device_address);
        result
    }

    /// Ask the running session to stop at its next step boundary without
    /// waiting for the robot lock. The following [`Self::on_disconnected`]
    /// resets the robot and clears the request.
    pub fn interrupt_session(&self) {
        self.abort.raise();
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether a cook session currently holds the claim.
    pub fn is_busy(&self) -> bool {
        self.session_active.load(Ordering::Acquire)
    }

    /// Whether the last reset completed and no fault has happened since.
    pub fn is_homed(&self) -> bool {
        self.homed.load(Ordering::Acquire)
    }

    /// Whether a disconnect is waiting for the running session to stop.
    pub fn abort_requested(&self) -> bool {
        self.abort.is_raised()
    }

    /// Lock and inspect the station (blocks while a session runs).
    pub fn station(&self) -> MutexGuard<'_, Station<M, L, D, E>> {
        self.lock_station()
    }

    pub fn into_station(self) -> Station<M, L, D, E> {
        self.station
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Internal ──────────────────────────────────────────────

    fn home(&self, station: &mut Station<M, L, D, E>) -> Result<ResetReport> {
        let result = station.bot.reset();
        self.homed.store(result.is_ok(), Ordering::Release);
        result
    }

    fn lock_station(&self) -> MutexGuard<'_, Station<M, L, D, E>> {
        // A panic inside a previous session leaves the robot usable: the
        // next reset re-establishes every reference position.
        self.station.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
