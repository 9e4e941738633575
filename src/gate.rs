use crate::backpressure::BacklogWatch;
use crate::budget::RateBudget;
use crate::buffer::{LineReceiver, QueuedLine};
use crate::config::ThrottleConfig;
use crate::error::{Result, ThrottleError};
use crate::metrics::RelayMetrics;
use crate::pause::{PauseGate, PauseState};
use crate::sink::OutputSink;
use crossbeam::channel::{self, select, Receiver};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, trace};

/// Consumes the line queue under the period-reset rate policy.
///
/// Owns the rate budget exclusively; the pause state is only published
/// through the relay metrics. The only shared object is the queue itself.
pub struct RateGate<W: Write> {
    config: ThrottleConfig,
    queue: LineReceiver,
    sink: OutputSink<W>,
    pause: PauseGate,
    budget: RateBudget,
    watch: BacklogWatch,
    metrics: RelayMetrics,
}

impl<W: Write> RateGate<W> {
    /// Create a pump over `queue` writing to `sink`
    pub fn new(
        config: ThrottleConfig,
        queue: LineReceiver,
        sink: OutputSink<W>,
        pause: PauseGate,
        metrics: RelayMetrics,
    ) -> Self {
        Self {
            budget: RateBudget::new(config.limit()),
            config,
            queue,
            sink,
            pause,
            watch: BacklogWatch::new(),
            metrics,
        }
    }

    /// Run until the queue is closed and drained, returning the output sink
    pub fn run(mut self) -> Result<OutputSink<W>> {
        let ticker = channel::tick(self.config.period());
        let lines = self.queue.channel().clone();
        debug!(
            limit = self.config.limit(),
            period_ms = self.config.period().as_millis() as u64,
            "rate gate started"
        );

        loop {
            if self.budget.is_exhausted() {
                wait_tick(&ticker)?;
                self.refill();
                continue;
            }

            select! {
                recv(ticker) -> _ => self.refill(),
                recv(lines) -> msg => match msg {
                    Ok(line) => self.emit(line)?,
                    Err(_) => break,
                },
            }
        }

        debug!("line queue closed and drained, rate gate finished");
        Ok(self.sink)
    }

    fn refill(&mut self) {
        trace!(remaining = self.budget.remaining(), "period tick, refilling budget");
        self.budget.refill();
        self.metrics.record_refill();
    }

    fn emit(&mut self, line: QueuedLine) -> Result<()> {
        self.budget.spend();
        self.sink.write_line(&line.bytes)?;
        self.metrics.record_emitted(line.read_at.elapsed());
        self.watch.observe(&self.queue);

        if self.config.is_stop_line(&line.bytes) {
            self.metrics.set_state(PauseState::Paused);
            let paused_for = self.pause.wait(&self.queue, &mut self.sink, &mut self.watch)?;
            self.metrics.record_pause(paused_for);
            self.metrics.set_state(PauseState::Running);
        }
        Ok(())
    }
}

fn wait_tick(ticker: &Receiver<Instant>) -> Result<()> {
    ticker
        .recv()
        .map(|_| ())
        .map_err(|_| ThrottleError::ThreadError("period ticker disconnected".into()))
}
