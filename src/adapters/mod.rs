//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements     | Connects to                    |
//! |------------------|----------------|--------------------------------|
//! | `channel_sink`   | EventSink      | Outbound channel → JSON lines  |
//! | `config_file`    | ConfigPort     | JSON file on disk              |
//! | `hardware`       | (assembly)     | Simulated motors + sensor      |
//! | `line_transport` | (inbound)      | Newline-delimited JSON input   |
//! | `log_sink`       | EventSink      | Log output                     |
//! |                  | IndicatorPort  |                                |
//! | `time`           | DelayNs        | System clock                   |

pub mod channel_sink;
pub mod config_file;
pub mod hardware;
pub mod line_transport;
pub mod log_sink;
pub mod time;
