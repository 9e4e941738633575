use crate::buffer::LineReceiver;
use tracing::{info, warn};

/// Watermark-based observer over the line queue backlog.
///
/// When utilization reaches the high watermark the backlog is considered
/// saturated (the source is about to block on the input stream); it is
/// released once utilization falls to the low watermark. Only logs.
#[derive(Debug)]
pub struct BacklogWatch {
    /// Threshold at which saturation is reported (percentage)
    high_watermark: u32,
    /// Threshold at which saturation is released (percentage)
    low_watermark: u32,
    saturated: bool,
}

/// State change reported by [`BacklogWatch::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklogTransition {
    /// Backlog crossed the high watermark
    Saturated,
    /// Backlog drained to the low watermark
    Released,
}

impl BacklogWatch {
    /// Create a new observer
    /// Default: high=80%, low=40%
    pub fn new() -> Self {
        Self::with_watermarks(80, 40)
    }

    /// Set custom watermark thresholds
    pub fn with_watermarks(high: u32, low: u32) -> Self {
        Self {
            high_watermark: high.min(100),
            low_watermark: low.min(100),
            saturated: false,
        }
    }

    /// Check a utilization percentage and return the transition, if any
    pub fn check_and_update(&mut self, utilization: u32) -> Option<BacklogTransition> {
        let now_saturated = if self.saturated {
            utilization > self.low_watermark
        } else {
            utilization >= self.high_watermark
        };

        if now_saturated == self.saturated {
            return None;
        }
        self.saturated = now_saturated;
        Some(if now_saturated {
            BacklogTransition::Saturated
        } else {
            BacklogTransition::Released
        })
    }

    /// Observe the queue and log saturation changes
    pub fn observe(&mut self, queue: &LineReceiver) -> Option<BacklogTransition> {
        let transition = self.check_and_update(queue.utilization())?;
        match transition {
            BacklogTransition::Saturated => warn!(
                backlog = queue.len(),
                capacity = queue.capacity(),
                "line queue saturated, input is being held back"
            ),
            BacklogTransition::Released => info!(
                backlog = queue.len(),
                capacity = queue.capacity(),
                "line queue drained below low watermark"
            ),
        }
        Some(transition)
    }
}

impl Default for BacklogWatch {
    fn default() -> Self {
        Self::new()
    }
}
