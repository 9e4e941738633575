use std::io;
use thiserror::Error;

/// Result type for line throttle operations
pub type Result<T> = std::result::Result<T, ThrottleError>;

/// Errors that can occur while relaying lines
#[derive(Error, Debug)]
pub enum ThrottleError {
    /// Configuration rejected before the relay starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stop pattern failed to compile
    #[error("Invalid stop pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Reading the input stream failed (only surfaced with `ReadErrorPolicy::Fail`)
    #[error("Input read error: {0}")]
    Input(#[source] io::Error),

    /// Writing to the output stream failed
    #[error("Output write error: {0}")]
    Output(#[source] io::Error),

    /// Opening or reading the controlling terminal failed
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Thread spawn or join error
    #[error("Thread error: {0}")]
    ThreadError(String),
}
