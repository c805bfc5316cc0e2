//! Inbound directives to the application service.
//!
//! The remote controller sends JSON objects tagged with a `type`
//! discriminator. Only `makeWaffles` is acted on; everything else is
//! ignored. Validation happens here so the sequencer only ever sees a
//! well-formed [`CookRequest`].

use core::time::Duration;

use serde_json::{Map, Value};

use crate::error::DirectiveError;

/// Directive `type` that starts a cook cycle.
pub const MAKE_WAFFLES: &str = "makeWaffles";

const FIELD_DESIRED: &str = "desiredWaffles";
const FIELD_COOK_MINUTES: &str = "cookTimeMinutes";
const FIELD_COOK_SECONDS: &str = "cookTimeSeconds";
const FIELD_DISPENSE_SECONDS: &str = "dispenseTimeSeconds";

/// A validated request to cook `desired_waffles` waffles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookRequest {
    pub desired_waffles: u32,
    pub cook_time_minutes: u32,
    pub cook_time_seconds: u32,
    pub dispense_time_seconds: u32,
}

impl CookRequest {
    /// Rejects a zero waffle count.
    pub fn new(
        desired_waffles: u32,
        cook_time_minutes: u32,
        cook_time_seconds: u32,
        dispense_time_seconds: u32,
    ) -> Result<Self, DirectiveError> {
        if desired_waffles == 0 {
            return Err(DirectiveError::InvalidField(FIELD_DESIRED));
        }
        Ok(Self {
            desired_waffles,
            cook_time_minutes,
            cook_time_seconds,
            dispense_time_seconds,
        })
    }

    /// Lid-closed time for one waffle.
    pub fn total_cook_time(&self) -> Duration {
        Duration::from_secs(
            u64::from(self.cook_time_minutes) * 60 + u64::from(self.cook_time_seconds),
        )
    }

    /// How long the dispenser is held open.
    pub fn dispense_time(&self) -> Duration {
        Duration::from_secs(u64::from(self.dispense_time_seconds))
    }
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    MakeWaffles(CookRequest),
    /// Any other `type`; carries the discriminator for logging.
    Ignored(String),
}

impl Directive {
    /// Parse a raw directive payload.
    pub fn parse(raw: &[u8]) -> Result<Self, DirectiveError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|_| DirectiveError::InvalidJson)?;
        let Value::Object(obj) = value else {
            return Err(DirectiveError::NotAnObject);
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DirectiveError::MissingType)?;

        if kind != MAKE_WAFFLES {
            return Ok(Self::Ignored(kind.to_owned()));
        }

        let request = CookRequest::new(
            numeric_field(&obj, FIELD_DESIRED)?,
            numeric_field(&obj, FIELD_COOK_MINUTES)?,
            numeric_field(&obj, FIELD_COOK_SECONDS)?,
            numeric_field(&obj, FIELD_DISPENSE_SECONDS)?,
        )?;
        Ok(Self::MakeWaffles(request))
    }
}

/// Read a non-negative integer field. Integral JSON numbers and strings
/// holding an integer are both accepted.
fn numeric_field(obj: &Map<String, Value>, name: &'static str) -> Result<u32, DirectiveError> {
    let value = obj.get(name).ok_or(DirectiveError::MissingField(name))?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 1e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(DirectiveError::InvalidField(name))
}
