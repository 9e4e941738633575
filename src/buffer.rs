use crossbeam::channel::{self, Receiver, RecvError, Sender, TrySendError};
use std::time::Instant;

/// A line waiting in the queue, stamped with the instant it was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedLine {
    /// Raw line bytes without the terminator, never re-encoded
    pub bytes: Vec<u8>,
    /// When the source read the line
    pub read_at: Instant,
}

impl QueuedLine {
    /// Stamp a freshly read line
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            read_at: Instant::now(),
        }
    }
}

/// Create a bounded, closable line queue.
///
/// The queue is closed once every [`LineSender`] is dropped; the receiver still
/// drains pending lines before it observes the closure.
pub fn line_queue(capacity: usize) -> (LineSender, LineReceiver) {
    let (tx, rx) = channel::bounded(capacity);
    (LineSender { tx }, LineReceiver { rx, capacity })
}

/// Producer half of the line queue
#[derive(Debug, Clone)]
pub struct LineSender {
    tx: Sender<QueuedLine>,
}

impl LineSender {
    /// Push a line, blocking while the queue is full.
    ///
    /// Returns `Ok(true)` when the queue was full and the send had to wait,
    /// or the line back if the receiver has gone away.
    pub fn send(&self, line: QueuedLine) -> Result<bool, QueuedLine> {
        match self.tx.try_send(line) {
            Ok(()) => Ok(false),
            Err(TrySendError::Full(line)) => self
                .tx
                .send(line)
                .map(|()| true)
                .map_err(|e| e.into_inner()),
            Err(TrySendError::Disconnected(line)) => Err(line),
        }
    }

    /// Close the queue from the producer side
    pub fn close(self) {
        drop(self);
    }
}

/// Consumer half of the line queue
#[derive(Debug)]
pub struct LineReceiver {
    rx: Receiver<QueuedLine>,
    capacity: usize,
}

impl LineReceiver {
    /// Block until a line is available; `Err` once closed and drained
    pub fn recv(&self) -> Result<QueuedLine, RecvError> {
        self.rx.recv()
    }

    /// Underlying channel, for use in `select!`
    pub(crate) fn channel(&self) -> &Receiver<QueuedLine> {
        &self.rx
    }

    /// Number of lines currently buffered (the backlog)
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Get the capacity of the queue
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the utilization of the queue as a percentage (0-100)
    pub fn utilization(&self) -> u32 {
        ((self.len() * 100) / self.capacity.max(1)).min(100) as u32
    }
}
