use crate::buffer::{LineSender, QueuedLine};
use crate::config::ReadErrorPolicy;
use crate::error::{Result, ThrottleError};
use crate::metrics::RelayMetrics;
use std::io::BufRead;
use tracing::{debug, warn};

/// Reads the input stream line by line into the line queue
pub struct LineSource<R: BufRead> {
    reader: R,
    policy: ReadErrorPolicy,
    metrics: RelayMetrics,
}

impl<R: BufRead> LineSource<R> {
    /// Create a new line source over `reader`
    pub fn new(reader: R, policy: ReadErrorPolicy, metrics: RelayMetrics) -> Self {
        Self {
            reader,
            policy,
            metrics,
        }
    }

    /// Read until end of input, pushing every line into the queue.
    ///
    /// Consumes the sender, so the queue is closed exactly once when this
    /// returns, on every path. Returns the number of lines queued.
    pub fn run(mut self, queue: LineSender) -> Result<u64> {
        let mut buf = Vec::new();
        let mut count = 0u64;

        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => match self.policy {
                    ReadErrorPolicy::Stop => {
                        warn!(error = %e, lines = count, "input read failed, treating as end of input");
                        break;
                    }
                    ReadErrorPolicy::Fail => return Err(ThrottleError::Input(e)),
                },
            }

            match queue.send(QueuedLine::new(trim_terminator(&buf))) {
                Ok(true) => self.metrics.record_block(),
                Ok(false) => {}
                Err(_) => {
                    debug!(lines = count, "line queue receiver dropped, stopping source");
                    break;
                }
            }
            self.metrics.record_read();
            count += 1;
        }

        debug!(lines = count, "input exhausted, closing line queue");
        queue.close();
        Ok(count)
    }
}

/// Strip a trailing `\n` or `\r\n`
fn trim_terminator(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::line_queue;
    use std::io::{self, BufReader, Cursor, Read};

    fn drain(rx: &crate::buffer::LineReceiver) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while let Ok(line) = rx.recv() {
            lines.push(line.bytes);
        }
        lines
    }

    /// Yields some bytes, then fails every read
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "device went away")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_reads_all_lines_and_closes() {
        let (tx, rx) = line_queue(16);
        let source = LineSource::new(
            Cursor::new("one\ntwo\r\nthree"),
            ReadErrorPolicy::Stop,
            RelayMetrics::new(),
        );
        assert_eq!(source.run(tx).unwrap(), 3);
        assert_eq!(drain(&rx), vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn test_empty_lines_preserved() {
        let (tx, rx) = line_queue(16);
        let source = LineSource::new(Cursor::new("\n\nx\n"), ReadErrorPolicy::Stop, RelayMetrics::new());
        assert_eq!(source.run(tx).unwrap(), 3);
        assert_eq!(drain(&rx), vec![b"".to_vec(), b"".to_vec(), b"x".to_vec()]);
    }

    #[test]
    fn test_non_utf8_bytes_kept_verbatim() {
        let (tx, rx) = line_queue(4);
        let source = LineSource::new(
            Cursor::new(b"caf\xe9\n\xff\xfe\r\n".to_vec()),
            ReadErrorPolicy::Stop,
            RelayMetrics::new(),
        );
        assert_eq!(source.run(tx).unwrap(), 2);
        assert_eq!(drain(&rx), vec![b"caf\xe9".to_vec(), b"\xff\xfe".to_vec()]);
    }

    #[test]
    fn test_full_queue_counts_block() {
        let (tx, rx) = line_queue(1);
        let metrics = RelayMetrics::new();
        let source = LineSource::new(Cursor::new("a\nb\n"), ReadErrorPolicy::Stop, metrics.clone());
        let handle = std::thread::spawn(move || source.run(tx));

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(drain(&rx), vec![b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(handle.join().unwrap().unwrap(), 2);
        assert_eq!(metrics.total_blocks(), 1);
    }

    #[test]
    fn test_read_error_stop_policy() {
        let (tx, rx) = line_queue(16);
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"kept\n".to_vec()),
        });
        let metrics = RelayMetrics::new();
        let source = LineSource::new(reader, ReadErrorPolicy::Stop, metrics.clone());
        assert_eq!(source.run(tx).unwrap(), 1);
        assert_eq!(drain(&rx), vec![b"kept".to_vec()]);
        assert_eq!(metrics.total_read(), 1);
    }

    #[test]
    fn test_read_error_fail_policy() {
        let (tx, rx) = line_queue(16);
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"kept\n".to_vec()),
        });
        let source = LineSource::new(reader, ReadErrorPolicy::Fail, RelayMetrics::new());
        assert!(matches!(source.run(tx), Err(ThrottleError::Input(_))));
        // The queue is still closed after a failure.
        assert_eq!(drain(&rx), vec![b"kept".to_vec()]);
    }

    #[test]
    fn test_stops_when_receiver_dropped() {
        let (tx, rx) = line_queue(1);
        drop(rx);
        let source = LineSource::new(Cursor::new("a\nb\n"), ReadErrorPolicy::Stop, RelayMetrics::new());
        assert_eq!(source.run(tx).unwrap(), 0);
    }
}
