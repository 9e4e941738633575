//! A rate-limited line relay for interactive log watching.
//!
//! Lines are read from an input stream into a bounded queue and re-emitted at
//! most `limit` per `period`. When an emitted line matches the stop pattern,
//! output freezes until the operator presses enter on the controlling terminal,
//! while the input keeps filling the queue.
//!
//! # Features
//!
//! - Bounded line queue with blocking backpressure to the input stream
//! - Period-reset rate budget driven by a fixed-interval ticker
//! - Interactive pause with a live backlog counter
//! - Relay metrics: lines read and emitted, pauses, queue dwell percentiles
//!
//! # Example
//!
//! ```ignore
//! use line_throttle::ThrottleConfig;
//! use std::time::Duration;
//!
//! let config = ThrottleConfig::builder()
//!     .limit(5)
//!     .period(Duration::from_millis(200))
//!     .stop("ERROR")
//!     .build()?;
//!
//! line_throttle::run(config)?;
//! ```

pub mod backpressure;
pub mod budget;
pub mod buffer;
pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod pause;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-exports for convenience
pub use backpressure::{BacklogTransition, BacklogWatch};
pub use budget::RateBudget;
pub use buffer::{line_queue, LineReceiver, LineSender, QueuedLine};
pub use config::{ReadErrorPolicy, ThrottleConfig, ThrottleConfigBuilder};
pub use error::{Result, ThrottleError};
pub use gate::RateGate;
pub use metrics::{DwellWindow, MetricsSnapshot, RelayMetrics};
pub use pause::{Confirm, PauseGate, PauseState, TerminalConfirm};
pub use pipeline::Relay;
pub use sink::OutputSink;
pub use source::LineSource;

use std::io::{self, BufReader};
use std::sync::Arc;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Relay standard input to standard output until input is exhausted,
/// pausing on the controlling terminal when the stop pattern matches.
pub fn run(config: ThrottleConfig) -> Result<MetricsSnapshot> {
    let stdout = io::stdout();
    Relay::new(config).run(
        BufReader::new(io::stdin()),
        stdout.lock(),
        Arc::new(TerminalConfirm),
    )
}
