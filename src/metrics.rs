use crate::pause::PauseState;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Dwell samples kept for percentile estimates
const DWELL_WINDOW: usize = 1000;

/// Queue dwell times of the most recently emitted lines
#[derive(Debug, Clone)]
pub struct DwellWindow {
    samples: Arc<Mutex<VecDeque<Duration>>>,
    size: usize,
}

impl DwellWindow {
    /// Keep the last `size` samples
    pub fn new(size: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(size))),
            size,
        }
    }

    pub fn record(&self, dwell: Duration) {
        let mut samples = self.samples.lock();
        if samples.len() == self.size {
            samples.pop_front();
        }
        samples.push_back(dwell);
    }

    /// Nearest-rank percentile in microseconds; 0 when empty
    pub fn percentile_us(&self, p: f64) -> f64 {
        let mut sorted: Vec<Duration> = self.samples.lock().iter().copied().collect();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_unstable();

        let rank = ((sorted.len() as f64 * p).ceil() as usize).clamp(1, sorted.len());
        sorted[rank - 1].as_nanos() as f64 / 1000.0
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}

/// Counters shared between the source and pump threads.
///
/// Clones share the same counters, so a handle taken before the relay starts
/// can be read while it runs.
#[derive(Debug, Clone)]
pub struct RelayMetrics {
    lines_read: Arc<AtomicU64>,
    lines_emitted: Arc<AtomicU64>,
    /// Sends that found the queue full and waited
    blocks: Arc<AtomicU64>,
    pauses: Arc<AtomicU64>,
    refills: Arc<AtomicU64>,
    paused_nanos: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    dwell: DwellWindow,
    start_time: Instant,
}

impl RelayMetrics {
    /// Create an empty metrics collector
    pub fn new() -> Self {
        Self {
            lines_read: Arc::new(AtomicU64::new(0)),
            lines_emitted: Arc::new(AtomicU64::new(0)),
            blocks: Arc::new(AtomicU64::new(0)),
            pauses: Arc::new(AtomicU64::new(0)),
            refills: Arc::new(AtomicU64::new(0)),
            paused_nanos: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(false)),
            dwell: DwellWindow::new(DWELL_WINDOW),
            start_time: Instant::now(),
        }
    }

    /// Record a line read from the input
    pub fn record_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a send that had to wait for room in the queue
    pub fn record_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a line written to the output, with the time it sat in the queue
    pub fn record_emitted(&self, dwell: Duration) {
        self.lines_emitted.fetch_add(1, Ordering::Relaxed);
        self.dwell.record(dwell);
    }

    /// Publish the pump's pause state
    pub fn set_state(&self, state: PauseState) {
        self.paused
            .store(state == PauseState::Paused, Ordering::Relaxed);
    }

    /// Record a completed interactive pause
    pub fn record_pause(&self, paused_for: Duration) {
        self.pauses.fetch_add(1, Ordering::Relaxed);
        self.paused_nanos
            .fetch_add(paused_for.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a budget refill at a period tick
    pub fn record_refill(&self) {
        self.refills.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether output is currently held for confirmation
    pub fn state(&self) -> PauseState {
        if self.paused.load(Ordering::Relaxed) {
            PauseState::Paused
        } else {
            PauseState::Running
        }
    }

    pub fn total_read(&self) -> u64 {
        self.lines_read.load(Ordering::Relaxed)
    }

    pub fn total_emitted(&self) -> u64 {
        self.lines_emitted.load(Ordering::Relaxed)
    }

    pub fn total_blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn total_pauses(&self) -> u64 {
        self.pauses.load(Ordering::Relaxed)
    }

    pub fn total_refills(&self) -> u64 {
        self.refills.load(Ordering::Relaxed)
    }

    /// Cumulative time spent paused
    pub fn time_paused(&self) -> Duration {
        Duration::from_nanos(self.paused_nanos.load(Ordering::Relaxed))
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.total_read(),
            lines_emitted: self.total_emitted(),
            blocks: self.total_blocks(),
            pauses: self.total_pauses(),
            refills: self.total_refills(),
            time_paused: self.time_paused(),
            dwell_p50_us: self.dwell.percentile_us(0.50),
            dwell_p95_us: self.dwell.percentile_us(0.95),
            dwell_p99_us: self.dwell.percentile_us(0.99),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of relay metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub lines_emitted: u64,
    pub blocks: u64,
    pub pauses: u64,
    pub refills: u64,
    pub time_paused: Duration,
    pub dwell_p50_us: f64,
    pub dwell_p95_us: f64,
    pub dwell_p99_us: f64,
    pub elapsed: Duration,
}

impl MetricsSnapshot {
    /// Format metrics as a human-readable string
    pub fn format(&self) -> String {
        format!(
            "Read: {}, Emitted: {}, Blocked sends: {}, Pauses: {} ({:.2}s), Refills: {}, \
             Dwell P50: {:.2}µs, P95: {:.2}µs, P99: {:.2}µs, Elapsed: {:.2}s",
            self.lines_read,
            self.lines_emitted,
            self.blocks,
            self.pauses,
            self.time_paused.as_secs_f64(),
            self.refills,
            self.dwell_p50_us,
            self.dwell_p95_us,
            self.dwell_p99_us,
            self.elapsed.as_secs_f64()
        )
    }
}
