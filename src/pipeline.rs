use crate::buffer::line_queue;
use crate::config::ThrottleConfig;
use crate::error::{Result, ThrottleError};
use crate::gate::RateGate;
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::pause::{Confirm, PauseGate};
use crate::sink::OutputSink;
use crate::source::LineSource;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Two cooperating tasks joined by the bounded line queue: a source thread
/// reading input and the rate gate pumping output on the calling thread.
pub struct Relay {
    config: ThrottleConfig,
    metrics: RelayMetrics,
}

impl Relay {
    /// Create a relay for a validated configuration
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            metrics: RelayMetrics::new(),
        }
    }

    /// Shared metrics, readable while the relay runs
    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Relay `input` to `output` until input is exhausted and every line emitted.
    ///
    /// If the pump fails the error is returned at once without waiting for the
    /// source thread, which may be blocked reading input; it stops on its
    /// next send since the queue receiver is gone.
    pub fn run<R, W>(self, input: R, output: W, confirm: Arc<dyn Confirm>) -> Result<MetricsSnapshot>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (tx, rx) = line_queue(self.config.queue_capacity());

        let source = LineSource::new(input, self.config.read_error_policy(), self.metrics.clone());
        let handle = thread::Builder::new()
            .name("line-throttle-source".into())
            .spawn(move || source.run(tx))
            .map_err(|e| ThrottleError::ThreadError(e.to_string()))?;

        let pause = PauseGate::new(confirm, self.config.status_interval());
        let gate = RateGate::new(
            self.config.clone(),
            rx,
            OutputSink::new(output),
            pause,
            self.metrics.clone(),
        );
        gate.run()?;

        let read = handle
            .join()
            .map_err(|_| ThrottleError::ThreadError("source thread panicked".into()))??;

        let snapshot = self.metrics.snapshot();
        debug!(lines = read, metrics = %snapshot.format(), "relay finished");
        Ok(snapshot)
    }
}
