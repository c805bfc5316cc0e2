//! Line-based inbound transport.
//!
//! On the host the remote controller link is a stream of newline-delimited
//! JSON objects (stdin in the binary). Each line is one of:
//!
//! ```text
//! {"connected": "00:16:53:AA:BB:CC"}      controller paired
//! {"disconnected": "00:16:53:AA:BB:CC"}   controller went away
//! {"type": "makeWaffles", ...}            directive, passed through raw
//! ```
//!
//! Blank lines are skipped. Anything that is not a connection message is
//! handed on as a directive; the dispatcher decides whether it is valid.

use std::io::{self, BufRead};

use log::{trace, warn};
use serde_json::Value;

use crate::error::DirectiveError;

/// Bluetooth-style device address of the remote controller.
pub type DeviceAddress = heapless::String<32>;

/// One decoded inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Connected(DeviceAddress),
    Disconnected(DeviceAddress),
    /// Raw directive bytes for [`WaffleService::handle_directive`].
    ///
    /// [`WaffleService::handle_directive`]: crate::app::service::WaffleService::handle_directive
    Directive(Vec<u8>),
}

fn address(value: &Value, field: &'static str) -> Result<DeviceAddress, DirectiveError> {
    let text = value.as_str().ok_or(DirectiveError::InvalidField(field))?;
    DeviceAddress::try_from(text).map_err(|_| DirectiveError::InvalidField(field))
}

/// Decode one line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<InboundMessage>, DirectiveError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(line) {
        if let Some(addr) = map.get("connected") {
            return address(addr, "connected").map(|a| Some(InboundMessage::Connected(a)));
        }
        if let Some(addr) = map.get("disconnected") {
            return address(addr, "disconnected").map(|a| Some(InboundMessage::Disconnected(a)));
        }
    }

    Ok(Some(InboundMessage::Directive(line.as_bytes().to_vec())))
}

/// Read `reader` to EOF, passing every decoded message to `on_message`.
///
/// Lines that fail to decode are logged and skipped; only I/O errors end
/// the loop early.
pub fn run<R, F>(reader: R, mut on_message: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(InboundMessage),
{
    for line in reader.lines() {
        let line = line?;
        trace!("inbound: {}", line);
        match parse_line(&line) {
            Ok(Some(msg)) => on_message(msg),
            Ok(None) => {}
            Err(e) => warn!("Skipping inbound line ({}): {}", e, line),
        }
    }
    Ok(())
}
