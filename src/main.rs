//! WaffleBot controller: host entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  line_transport (stdin)        channel_sink → stdout         │
//! │  SimMotor × 4 · SimLightSensor  LogEventSink · LogIndicator  │
//! │  SystemDelay                    JsonConfigFile               │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │          WaffleService (pure logic)                 │      │
//! │  │  CookSequencer · Diagnostics · WaffleBot::reset     │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The reader thread forwards connection messages, in order, to a single
//! link thread and starts one session thread per directive. A disconnect
//! interrupts the running cook as soon as it is read, before it waits its
//! turn on the link thread. Outbound speech events are written to stdout as JSON lines; logs
//! go to stderr.
#![deny(unused_must_use)]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;
use log::{error, info};
use tracing_subscriber::EnvFilter;

use wafflebot::adapters::channel_sink::{self, ChannelEventSink, EVENT_CHANNEL};
use wafflebot::adapters::config_file::JsonConfigFile;
use wafflebot::adapters::hardware::build_sim_bot;
use wafflebot::adapters::line_transport::{self, DeviceAddress, InboundMessage};
use wafflebot::adapters::log_sink::{LogEventSink, LogIndicator};
use wafflebot::adapters::time::SystemDelay;
use wafflebot::app::ports::ConfigPort;
use wafflebot::app::service::{Station, WaffleService};
use wafflebot::config::BotConfig;
use wafflebot::sensors::light::SimLightSensor;

/// Connection lifecycle work handed to the link thread.
enum LinkEvent {
    Connected(DeviceAddress),
    Disconnected(DeviceAddress),
    Closed,
}

static LINK_CHANNEL: Channel<CriticalSectionRawMutex, LinkEvent, 4> = Channel::new();

#[derive(Parser)]
#[command(version, about)]
struct Opts {
    /// JSON config file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Divide every wait by this factor
    #[arg(long, default_value_t = 1)]
    speedup: u32,
    /// Heat checks the simulated iron stays cold for
    #[arg(long, default_value_t = 0)]
    sim_hot_after: u32,
    /// Simulate a waffle stuck on the cooking surface
    #[arg(long)]
    sim_obstructed: bool,
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<BotConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(BotConfig::default());
    };
    JsonConfigFile::new(path)
        .load()
        .with_context(|| format!("loading config from {}", path.display()))
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);
    info!("WaffleBot v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let config = load_config(opts.config.as_ref())?;

    // ── 2. Hardware + service ─────────────────────────────────
    let light = SimLightSensor::new(opts.sim_hot_after, opts.sim_obstructed);
    let station = Station {
        bot: build_sim_bot(&config.motion, light),
        delay: SystemDelay::new(opts.speedup),
        sink: (LogEventSink::new(), ChannelEventSink::new(&EVENT_CHANNEL)),
    };
    let service = Arc::new(WaffleService::new(&config, station));

    // ── 3. Outbound writer ────────────────────────────────────
    let writer = thread::Builder::new()
        .name("event-writer".into())
        .spawn(|| channel_sink::drain_to(&EVENT_CHANNEL, io::stdout().lock()))
        .context("spawning event writer")?;

    // ── 4. Link lifecycle ─────────────────────────────────────
    let link = {
        let service = Arc::clone(&service);
        thread::Builder::new()
            .name("link".into())
            .spawn(move || {
                let mut indicator = LogIndicator::new();
                loop {
                    match block_on(LINK_CHANNEL.receive()) {
                        LinkEvent::Connected(addr) => {
                            if let Err(e) = service.on_connected(&addr, &mut indicator) {
                                error!("Reset after connect failed: {}", e);
                            }
                        }
                        LinkEvent::Disconnected(addr) => {
                            if let Err(e) = service.on_disconnected(&addr, &mut indicator) {
                                error!("Reset after disconnect failed: {}", e);
                            }
                        }
                        LinkEvent::Closed => return,
                    }
                }
            })
            .context("spawning link thread")?
    };

    // ── 5. Inbound loop ───────────────────────────────────────
    let mut sessions: Vec<JoinHandle<()>> = Vec::new();

    line_transport::run(io::stdin().lock(), |msg| match msg {
        InboundMessage::Connected(addr) => {
            block_on(LINK_CHANNEL.send(LinkEvent::Connected(addr)));
        }
        InboundMessage::Disconnected(addr) => {
            service.interrupt_session();
            block_on(LINK_CHANNEL.send(LinkEvent::Disconnected(addr)));
        }
        InboundMessage::Directive(raw) => {
            sessions.retain(|s| !s.is_finished());
            let service = Arc::clone(&service);
            let spawned = thread::Builder::new()
                .name("cook-session".into())
                .spawn(move || {
                    service.handle_directive(&raw);
                });
            match spawned {
                Ok(handle) => sessions.push(handle),
                Err(e) => error!("Could not start session thread: {}", e),
            }
        }
    })
    .context("reading inbound messages")?;

    // ── 6. Shutdown ───────────────────────────────────────────
    info!("Input closed, waiting for running sessions");
    block_on(LINK_CHANNEL.send(LinkEvent::Closed));
    if link.join().is_err() {
        error!("Link thread panicked");
    }
    for session in sessions {
        if session.join().is_err() {
            error!("Cook session thread panicked");
        }
    }
    channel_sink::request_shutdown(&EVENT_CHANNEL);
    writer
        .join()
        .map_err(|_| anyhow!("event writer panicked"))?
        .context("writing events")?;

    info!("WaffleBot stopped");
    Ok(())
}
