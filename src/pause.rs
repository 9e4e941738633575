use crate::backpressure::BacklogWatch;
use crate::buffer::LineReceiver;
use crate::error::{Result, ThrottleError};
use crate::sink::OutputSink;
use crossbeam::channel::{self, select};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Whether the pump is currently emitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PauseState {
    #[default]
    Running,
    /// Waiting for the operator; nothing is dequeued
    Paused,
}

/// Source of the operator's go-ahead while output is paused.
///
/// Called on a dedicated thread; blocking is expected.
pub trait Confirm: Send + Sync + 'static {
    /// Block until the operator confirms, returning what they typed
    fn confirm(&self) -> Result<String>;
}

/// Reads one line from the controlling terminal with echo disabled.
///
/// The keystrokes, including the final enter, are not echoed, so the cursor
/// stays on the status line and erasing it leaves no trace. The terminal
/// device (`/dev/tty` or `CONIN$`) is opened for each confirmation and its
/// echo mode restored when the read returns, on success or failure, so
/// standard input may stay redirected to the data stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self) -> Result<String> {
        rpassword::read_password()
            .map_err(|e| ThrottleError::Terminal(format!("failed to read from terminal: {e}")))
    }
}

/// Status text shown while paused
pub fn status_text(backlog: usize) -> String {
    format!("stopped: press enter to continue ({backlog} lines queued)")
}

/// Holds output until the operator confirms continuation
pub struct PauseGate {
    confirm: Arc<dyn Confirm>,
    status_interval: Duration,
}

impl PauseGate {
    /// Create a pause gate that refreshes its status every `status_interval`
    pub fn new(confirm: Arc<dyn Confirm>, status_interval: Duration) -> Self {
        Self {
            confirm,
            status_interval,
        }
    }

    /// Block until confirmation, keeping the backlog counter live.
    ///
    /// Never dequeues from `queue`. Returns how long output was paused.
    pub fn wait<W: Write>(
        &self,
        queue: &LineReceiver,
        sink: &mut OutputSink<W>,
        watch: &mut BacklogWatch,
    ) -> Result<Duration> {
        let started = Instant::now();
        let (done_tx, done_rx) = channel::bounded(1);
        let confirm = Arc::clone(&self.confirm);

        thread::Builder::new()
            .name("line-throttle-confirm".into())
            .spawn(move || {
                let _ = done_tx.send(confirm.confirm());
            })
            .map_err(|e| ThrottleError::ThreadError(e.to_string()))?;

        info!(backlog = queue.len(), "output paused, waiting for confirmation");

        loop {
            sink.render_status(&status_text(queue.len()))?;
            watch.observe(queue);

            select! {
                recv(done_rx) -> msg => {
                    let answer = match msg {
                        Ok(result) => result?,
                        Err(_) => {
                            return Err(ThrottleError::Terminal(
                                "confirmation reader exited without an answer".into(),
                            ))
                        }
                    };
                    debug!(answer = %answer, "confirmation received");
                    break;
                }
                default(self.status_interval) => {}
            }
        }

        sink.clear_status()?;
        let paused_for = started.elapsed();
        info!(
            backlog = queue.len(),
            paused_ms = paused_for.as_millis() as u64,
            "output resumed"
        );
        Ok(paused_for)
    }
}
