//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing every outbound
//! event to the logger, so an operator watching stderr sees what the
//! remote side was told. [`LogIndicator`] stands in for the brick's status
//! LEDs on hosts that have none.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, IndicatorPort};

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::HeatingStarted => info!("EVENT | heating started"),
            AppEvent::IronReady => info!("EVENT | iron ready"),
            AppEvent::HeatFailure => info!("EVENT | heat failure"),
            AppEvent::Obstruction => info!("EVENT | obstruction"),
        }
        info!("SPEECH | {}", event.speech_out());
    }
}

/// Ready indicator that only logs its transitions.
#[derive(Debug, Default)]
pub struct LogIndicator {
    ready: bool,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl IndicatorPort for LogIndicator {
    fn set_ready(&mut self, ready: bool) {
        if ready != self.ready {
            info!("LED | {}", if ready { "green" } else { "black" });
        }
        self.ready = ready;
    }
}
