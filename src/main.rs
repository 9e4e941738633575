//! line-throttle - relay stdin to stdout at a bounded line rate
//!
//! # Usage
//!
//! ```bash
//! # Two lines every 500ms
//! tail -f app.log | line-throttle --limit 2 --period 500
//!
//! # Freeze output on errors until enter is pressed
//! cat build.log | line-throttle -l 20 -s 'error|panicked'
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use line_throttle::{ReadErrorPolicy, ThrottleConfig};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Relay lines from stdin to stdout at a bounded rate
#[derive(Parser, Debug)]
#[command(name = "line-throttle")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output line num per period
    #[arg(short, long, default_value_t = 1)]
    limit: u32,

    /// Output limit period (milliseconds)
    #[arg(short, long, default_value_t = 100)]
    period: u64,

    /// Pause output after a line matching this regex until enter is pressed
    #[arg(short, long, default_value = "")]
    stop: String,

    /// Maximum number of lines buffered ahead of the output
    #[arg(short, long, default_value_t = 10_000)]
    queue_capacity: usize,

    /// Exit with an error when reading stdin fails instead of stopping quietly
    #[arg(long)]
    fail_on_read_error: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG is used when unset
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("line-throttle: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level.as_deref())?;

    let config = ThrottleConfig::builder()
        .limit(cli.limit)
        .period(Duration::from_millis(cli.period))
        .stop(cli.stop)
        .queue_capacity(cli.queue_capacity)
        .read_error_policy(if cli.fail_on_read_error {
            ReadErrorPolicy::Fail
        } else {
            ReadErrorPolicy::Stop
        })
        .build()
        .context("invalid configuration")?;

    line_throttle::run(config).context("relay failed")?;
    Ok(())
}

/// Initialize the tracing subscriber; logs go to stderr since stdout carries data
fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();

    Ok(())
}
