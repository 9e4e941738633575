use crate::error::{Result, ThrottleError};
use regex::bytes::Regex;
use std::time::Duration;

/// Lines permitted per period when nothing else is configured
pub const DEFAULT_LIMIT: u32 = 1;
/// Default period length
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);
/// Default bound of the line queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;
/// Default refresh interval of the paused status line
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(50);

/// What the line source does when reading the input stream fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadErrorPolicy {
    /// Log the error and treat it as end of input
    #[default]
    Stop,
    /// Abort the relay with `ThrottleError::Input`
    Fail,
}

/// Resolved, validated relay configuration.
///
/// Built once through [`ThrottleConfig::builder`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    limit: u32,
    period: Duration,
    stop_pattern: Option<Regex>,
    queue_capacity: usize,
    read_error_policy: ReadErrorPolicy,
    status_interval: Duration,
}

impl ThrottleConfig {
    /// Start building a configuration from the defaults
    pub fn builder() -> ThrottleConfigBuilder {
        ThrottleConfigBuilder::new()
    }

    /// Lines permitted per period
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Length of one rate period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Compiled stop pattern, if pausing is enabled
    pub fn stop_pattern(&self) -> Option<&Regex> {
        self.stop_pattern.as_ref()
    }

    /// Bound of the line queue
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Input read error handling
    pub fn read_error_policy(&self) -> ReadErrorPolicy {
        self.read_error_policy
    }

    /// Refresh interval of the status line while paused
    pub fn status_interval(&self) -> Duration {
        self.status_interval
    }

    /// Whether `line` should trigger an interactive pause.
    ///
    /// Matches raw bytes, so lines that are not valid UTF-8 can still match.
    pub fn is_stop_line(&self, line: &[u8]) -> bool {
        self.stop_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(line))
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            period: DEFAULT_PERIOD,
            stop_pattern: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            read_error_policy: ReadErrorPolicy::Stop,
            status_interval: DEFAULT_STATUS_INTERVAL,
        }
    }
}

/// Builder for [`ThrottleConfig`]
#[derive(Debug, Clone)]
pub struct ThrottleConfigBuilder {
    limit: u32,
    period: Duration,
    stop: String,
    queue_capacity: usize,
    read_error_policy: ReadErrorPolicy,
    status_interval: Duration,
}

impl ThrottleConfigBuilder {
    /// Create a builder holding the default configuration
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            period: DEFAULT_PERIOD,
            stop: String::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            read_error_policy: ReadErrorPolicy::Stop,
            status_interval: DEFAULT_STATUS_INTERVAL,
        }
    }

    /// Set the number of lines permitted per period
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Set the period length
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the stop pattern; an empty string disables pausing
    pub fn stop(mut self, pattern: impl Into<String>) -> Self {
        self.stop = pattern.into();
        self
    }

    /// Set the line queue bound
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the input read error policy
    pub fn read_error_policy(mut self, policy: ReadErrorPolicy) -> Self {
        self.read_error_policy = policy;
        self
    }

    /// Set the status line refresh interval
    pub fn status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<ThrottleConfig> {
        // A zero budget would never refill to anything usable.
        if self.limit == 0 {
            return Err(ThrottleError::Config("limit must be at least 1".into()));
        }
        if self.period.is_zero() {
            return Err(ThrottleError::Config("period must be greater than zero".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ThrottleError::Config("queue capacity must be at least 1".into()));
        }
        if self.status_interval.is_zero() {
            return Err(ThrottleError::Config(
                "status interval must be greater than zero".into(),
            ));
        }

        let stop_pattern = if self.stop.is_empty() {
            None
        } else {
            Some(Regex::new(&self.stop)?)
        };

        Ok(ThrottleConfig {
            limit: self.limit,
            period: self.period,
            stop_pattern,
            queue_capacity: self.queue_capacity,
            read_error_policy: self.read_error_policy,
            status_interval: self.status_interval,
        })
    }
}

impl Default for ThrottleConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
