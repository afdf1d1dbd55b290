//! Gravity tick source
//!
//! Accumulates elapsed time and reports when the next gravity step is due.
//! The caller feeds it time; it never reads a clock itself.

use std::time::Duration;

/// Default interval between gravity steps
pub const DEFAULT_GRAVITY: Duration = Duration::from_millis(1000);
/// Speed-ups stop here
pub const MIN_GRAVITY: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct Gravity {
    interval: Duration,
    elapsed: Duration,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::new(DEFAULT_GRAVITY)
    }
}

impl Gravity {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_GRAVITY),
            elapsed: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Take 7/8 of the current interval
    pub fn speed_up(&mut self) {
        self.interval = (self.interval - self.interval / 8).max(MIN_GRAVITY);
    }

    /// Add elapsed time. Returns true if at least one tick became due.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return false;
        }
        // Missed ticks collapse into one
        let carry = self.elapsed.as_nanos() % self.interval.as_nanos();
        self.elapsed = Duration::from_nanos(carry as u64);
        true
    }

    /// Restart the current interval
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Time left until the next tick
    pub fn remaining(&self) -> Duration {
        self.interval.saturating_sub(self.elapsed)
    }
}
