//! Outbound application events.
//!
//! The [`CookSequencer`](crate::fsm::sequencer::CookSequencer) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Every event the
//! remote skill understands is a `Speech` event carrying the sentence it
//! should say; the tagged union below pins each sentence to one variant so
//! a malformed payload cannot be built.

use serde::Serialize;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The iron was cold at the start of a request; polling begins.
    HeatingStarted,
    /// The iron became hot while polling.
    IronReady,
    /// The iron never reached temperature; the request is abandoned.
    HeatFailure,
    /// The cooking surface stayed obstructed after recovery attempts.
    Obstruction,
}

impl AppEvent {
    /// Wire-level event name.
    pub fn name(&self) -> EventName {
        EventName::Speech
    }

    /// Sentence the remote side speaks for this event.
    pub fn speech_out(&self) -> &'static str {
        match self {
            Self::HeatingStarted => {
                "Waffle bot needs to heat up the waffle iron. Your request will continue when the waffle iron is ready."
            }
            Self::IronReady => {
                "The waffle iron is ready. Waffle bot can continue your request."
            }
            Self::HeatFailure => {
                "Waffle bot encountered a problem heating up the waffle iron. Please check the waffle iron and try your request again."
            }
            Self::Obstruction => {
                "Waffle bot has detected an obstruction on the cooking surface. Please clear the obstruction and try your request again."
            }
        }
    }

    /// Build the JSON-serialisable frame sent to the remote controller.
    pub fn to_wire(&self) -> WireEvent {
        WireEvent {
            name: self.name(),
            payload: SpeechPayload {
                speech_out: self.speech_out(),
            },
        }
    }
}

/// Custom event names understood by the remote skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventName {
    Speech,
}

/// `{ "speechOut": "..." }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechPayload {
    pub speech_out: &'static str,
}

/// `{ "name": "Speech", "payload": { "speechOut": "..." } }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WireEvent {
    pub name: EventName,
    pub payload: SpeechPayload,
}
