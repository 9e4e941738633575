use crate::error::{Result, ThrottleError};
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::Write;

/// Writes permitted lines to the output stream, flushing after each one
pub struct OutputSink<W: Write> {
    out: W,
    status_shown: bool,
}

impl<W: Write> OutputSink<W> {
    /// Wrap an output stream
    pub fn new(out: W) -> Self {
        Self {
            out,
            status_shown: false,
        }
    }

    /// Write one line's bytes and a `\n` terminator, then flush
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        if self.status_shown {
            self.clear_status()?;
        }
        self.out.write_all(line).map_err(ThrottleError::Output)?;
        self.out.write_all(b"\n").map_err(ThrottleError::Output)?;
        self.out.flush().map_err(ThrottleError::Output)
    }

    /// Rewrite the transient status line in place (carriage return, no newline)
    pub fn render_status(&mut self, status: &str) -> Result<()> {
        write!(self.out, "\r{status}").map_err(ThrottleError::Output)?;
        self.out.flush().map_err(ThrottleError::Output)?;
        self.status_shown = true;
        Ok(())
    }

    /// Erase the status line and return the cursor to column zero
    pub fn clear_status(&mut self) -> Result<()> {
        self.out
            .queue(MoveToColumn(0))
            .and_then(|out| out.queue(Clear(ClearType::CurrentLine)))
            .map_err(ThrottleError::Output)?;
        self.out.flush().map_err(ThrottleError::Output)?;
        self.status_shown = false;
        Ok(())
    }

    /// Get a reference to the wrapped stream
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap the output stream
    pub fn into_inner(self) -> W {
        self.out
    }
}
