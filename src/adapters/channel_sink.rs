//! Outbound event channel.
//!
//! Session threads must never block on the remote link, so the
//! [`ChannelEventSink`] only pushes frames into a bounded `embassy-sync`
//! channel. A single writer thread runs [`drain_to`], which awaits the
//! channel and serialises each frame as one JSON line.
//!
//! ```text
//! ┌──────────────┐  Outbound   ┌──────────────┐  JSON lines
//! │ session thr. │───────────▶│ writer thread │───────────▶ stdout
//! │ (sync)       │ try_send    │ block_on(rx)  │
//! └──────────────┘             └──────────────┘
//! ```

use std::io::{self, Write};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use crate::app::events::{AppEvent, WireEvent};
use crate::app::ports::EventSink;

/// Frames queued for the writer thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outbound {
    Event(WireEvent),
    /// Stop the writer once everything queued before it is written.
    Shutdown,
}

/// Channel depth for outbound frames.
const EVENT_DEPTH: usize = 16;

pub type EventChannel = Channel<CriticalSectionRawMutex, Outbound, EVENT_DEPTH>;

/// Outbound channel shared by the sink and the writer thread.
pub static EVENT_CHANNEL: EventChannel = Channel::new();

/// [`EventSink`] that queues wire frames for the writer thread.
#[derive(Clone, Copy)]
pub struct ChannelEventSink {
    channel: &'static EventChannel,
}

impl ChannelEventSink {
    pub fn new(channel: &'static EventChannel) -> Self {
        Self { channel }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&mut self, event: &AppEvent) {
        if self.channel.try_send(Outbound::Event(event.to_wire())).is_err() {
            warn!("Event channel full, dropping {:?}", event);
        }
    }
}

/// Ask the writer thread to stop after the frames already queued.
///
/// Never blocks: if the channel is full (the writer has stalled or died)
/// the queued frames are discarded to make room for the shutdown frame.
pub fn request_shutdown(channel: &'static EventChannel) {
    if channel.try_send(Outbound::Shutdown).is_ok() {
        return;
    }
    warn!(
        "Event channel full at shutdown, discarding {} queued frame(s)",
        channel.len()
    );
    channel.clear();
    if channel.try_send(Outbound::Shutdown).is_err() {
        warn!("Could not queue shutdown frame");
    }
}

/// Writer loop: serialise every queued event to `writer` as one JSON line
/// until a [`Outbound::Shutdown`] frame arrives.
///
/// After the first write error the loop keeps receiving and discards
/// frames, so senders never see a permanently full channel. That error is
/// returned once shutdown arrives.
pub fn drain_to<W: Write>(channel: &'static EventChannel, mut writer: W) -> io::Result<()> {
    let mut failed: Option<io::Error> = None;
    loop {
        match futures_lite::future::block_on(channel.receive()) {
            Outbound::Event(frame) if failed.is_none() => {
                if let Err(e) = write_frame(&mut writer, &frame) {
                    warn!("Event writer failed, discarding further events: {}", e);
                    failed = Some(e);
                } else {
                    debug!("Sent {:?} event", frame.name);
                }
            }
            Outbound::Event(frame) => debug!("Discarded {:?} event", frame.name),
            Outbound::Shutdown => return failed.map_or(Ok(()), Err),
        }
    }
}

fn write_frame<W: Write>(writer: &mut W, frame: &WireEvent) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, frame)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
