//! The cook sequencer.
//!
//! Runs one cook request end to end against a borrowed [`WaffleBot`]:
//! close the lid, make sure the iron is hot, then dispense, cook and
//! retrieve one waffle at a time until the requested count is reached or
//! something stops the run.
//!
//! All waits go through the injected [`DelayNs`], and every motor call
//! blocks until its motion is done, so a sensor read always sees the arm
//! where the previous step left it.
//!
//! The [`AbortSignal`] is checked between steps. A raised signal ends the
//! session in [`CookPhase::AbortedDisconnect`] without emitting anything.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::app::commands::CookRequest;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LightSensorPort, MotorPort};
use crate::config::CookConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::robot::WaffleBot;

use super::context::CookSession;
use super::{AbortSignal, CookOutcome, CookPhase, CookReport, wait};

/// Pickup/deliver pairs run before the first surface check, and again
/// before the second.
pub const RETRIEVAL_PASSES: u32 = 2;

/// Why a session stopped before its normal end.
enum Halt {
    Disconnected,
    Fault(Error),
}

impl From<Error> for Halt {
    fn from(e: Error) -> Self {
        Self::Fault(e)
    }
}

type Step<T> = Result<T, Halt>;

fn checkpoint(abort: &AbortSignal) -> Step<()> {
    if abort.is_raised() {
        Err(Halt::Disconnected)
    } else {
        Ok(())
    }
}

/// Drives a cook request through its phases.
#[derive(Debug, Clone, Copy)]
pub struct CookSequencer {
    config: CookConfig,
    diagnostics: Diagnostics,
}

impl CookSequencer {
    pub fn new(config: CookConfig, diagnostics: Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Run `request` to completion or abort.
    ///
    /// Never fails: faults end the session in [`CookPhase::AbortedFault`]
    /// and are reported through the returned [`CookReport`].
    pub fn make_waffles<M, L>(
        &self,
        bot: &mut WaffleBot<M, L>,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        abort: &AbortSignal,
        request: &CookRequest,
    ) -> CookReport
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        info!(
            "Make waffles: desired={} cook={}m{}s dispense={}s",
            request.desired_waffles,
            request.cook_time_minutes,
            request.cook_time_seconds,
            request.dispense_time_seconds
        );

        let mut session = CookSession::new(request.desired_waffles);
        let outcome = match self.run(&mut session, bot, delay, sink, abort, request) {
            Ok(outcome) => outcome,
            Err(Halt::Disconnected) => {
                warn!(
                    "Cook session abandoned in {} after {} waffle(s)",
                    session.phase(),
                    session.made_waffles()
                );
                CookOutcome::Disconnected
            }
            Err(Halt::Fault(e)) => {
                error!("Cook session failed in {}: {}", session.phase(), e);
                CookOutcome::Fault(e)
            }
        };
        session.enter(outcome.phase());

        CookReport {
            outcome,
            made_waffles: session.made_waffles(),
        }
    }

    fn run<M, L>(
        &self,
        session: &mut CookSession,
        bot: &mut WaffleBot<M, L>,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        abort: &AbortSignal,
        request: &CookRequest,
    ) -> Step<CookOutcome>
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        checkpoint(abort)?;
        session.enter(CookPhase::HeatingIron);
        bot.close_lid()?;

        checkpoint(abort)?;
        if !self.diagnostics.is_iron_hot(bot, delay)? && !self.heat_iron(bot, delay, sink, abort)? {
            sink.emit(&AppEvent::HeatFailure);
            return Ok(CookOutcome::HeatFailure);
        }
        session.mark_iron_ready();

        checkpoint(abort)?;
        bot.open_lid()?;

        while session.wants_more() {
            // ── Dispense ──────────────────────────────────────
            checkpoint(abort)?;
            session.enter(CookPhase::DispensingBatter);
            bot.press_dispenser()?;
            wait(delay, request.dispense_time());
            bot.release_dispenser()?;
            wait(delay, self.batter_settle());

            // ── Cook ──────────────────────────────────────────
            checkpoint(abort)?;
            session.enter(CookPhase::Cooking);
            bot.close_lid()?;
            let cook_time = request.total_cook_time();
            info!("Cooking for {}s", cook_time.as_secs());
            wait(delay, cook_time);

            checkpoint(abort)?;
            bot.open_lid()?;

            // ── Retrieve ──────────────────────────────────────
            checkpoint(abort)?;
            session.enter(CookPhase::Retrieving);
            self.retrieve(bot)?;

            checkpoint(abort)?;
            if !self.diagnostics.is_surface_clear(bot, delay)? {
                warn!("Cooking surface not clear, retrying retrieval");
                checkpoint(abort)?;
                self.retrieve(bot)?;

                checkpoint(abort)?;
                if !self.diagnostics.is_surface_clear(bot, delay)? {
                    warn!("Obstruction persists on cooking surface");
                    sink.emit(&AppEvent::Obstruction);
                    return Ok(CookOutcome::Obstruction);
                }
            }
            session.waffle_made();
        }

        Ok(CookOutcome::Completed)
    }

    /// Poll the heat lamp until it lights or the attempt budget runs out.
    /// Returns `true` once the iron is hot.
    fn heat_iron<M, L>(
        &self,
        bot: &mut WaffleBot<M, L>,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
        abort: &AbortSignal,
    ) -> Step<bool>
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        info!("Iron is cold, waiting for it to heat up");
        sink.emit(&AppEvent::HeatingStarted);

        let max = self.config.heat_max_attempts;
        for attempt in 1..=max {
            wait(delay, self.heat_poll_interval());
            checkpoint(abort)?;
            if self.diagnostics.is_iron_hot(bot, delay)? {
                info!("Iron hot after {} check(s)", attempt);
                sink.emit(&AppEvent::IronReady);
                return Ok(true);
            }
            debug!("Iron still cold ({}/{})", attempt, max);
        }

        error!("Iron not hot after {} checks, giving up", max);
        Ok(false)
    }

    /// Two pickup/deliver passes of the fork arm.
    fn retrieve<M, L>(&self, bot: &mut WaffleBot<M, L>) -> Result<(), Error>
    where
        M: MotorPort,
        L: LightSensorPort,
    {
        for _ in 0..RETRIEVAL_PASSES {
            bot.pick_up_waffle()?;
            bot.deliver_waffle()?;
        }
        Ok(())
    }

    fn heat_poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.heat_poll_interval_secs))
    }

    fn batter_settle(&self) -> Duration {
        Duration::from_secs(u64::from(self.config.batter_settle_secs))
    }
}
