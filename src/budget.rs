/// Lines still permitted in the current period.
///
/// Reset to the full limit at every period tick rather than replenished
/// gradually, so a period may open with a burst of up to `limit` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    limit: u32,
    remaining: u32,
}

impl RateBudget {
    /// Create a full budget
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Remaining emissions in this period
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether emission must wait for the next tick
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Consume one emission; returns false if the budget was already empty
    pub fn spend(&mut self) -> bool {
        match self.remaining.checked_sub(1) {
            Some(left) => {
                self.remaining = left;
                true
            }
            None => false,
        }
    }

    /// Reset to the full limit at a period boundary
    pub fn refill(&mut self) {
        self.remaining = self.limit;
    }
}
