//! Time-based debounce filter.
//!
//! Turns an instantaneous boolean condition into a *confirmed* one that
//! only flips after the raw condition has held continuously for a minimum
//! duration.  Progress is an elapsed-time accumulator rather than a tick
//! counter, so the filter is independent of the polling rate:
//!
//! ```text
//!  condition:  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|____|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!  elapsed:    /‾‾‾‾‾‾‾‾‾ (saturates)  0    /‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!  confirmed:  ____________|‾‾‾‾‾‾‾‾‾‾|_________________|‾‾‾‾‾‾‾‾‾‾‾
//!                       threshold                  threshold
//! ```
//!
//! A single false observation resets progress to zero immediately.

use core::time::Duration;

/// Debounce accumulator for one monitored condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceFilter {
    threshold: Duration,
    elapsed: Duration,
    confirmed: bool,
}

impl DebounceFilter {
    /// Create a filter that confirms after `threshold` of continuous truth.
    pub const fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            elapsed: Duration::ZERO,
            confirmed: false,
        }
    }

    /// Feed one observation covering `dt` of wall-clock time.
    ///
    /// Returns `true` once the condition has held for at least the
    /// threshold.  The accumulator saturates at the threshold.
    pub fn update(&mut self, condition: bool, dt: Duration) -> bool {
        if !condition {
            self.reset();
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt).min(self.threshold);
        self.confirmed = self.elapsed >= self.threshold;
        self.confirmed
    }

    /// Tick-counting form of [`update`](Self::update): one observation per
    /// fixed-period tick.
    pub fn update_tick(&mut self, condition: bool, tick_period: Duration) -> bool {
        self.update(condition, tick_period)
    }

    /// Whether the last observation left the condition confirmed.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Continuous time the condition has held (capped at the threshold).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Time still needed before confirmation.
    pub fn remaining(&self) -> Duration {
        self.threshold.saturating_sub(self.elapsed)
    }

    /// True while the condition holds but is not yet confirmed.
    pub fn is_pending(&self) -> bool {
        !self.elapsed.is_zero() && self.elapsed < self.threshold
    }

    /// Change the confirmation threshold, keeping accumulated progress.
    ///
    /// Confirmation is re-evaluated on the next [`update`](Self::update).
    pub fn set_threshold(&mut self, threshold: Duration) {
        self.threshold = threshold;
        self.elapsed = self.elapsed.min(threshold);
    }

    /// Drop all progress.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.confirmed = false;
    }
}
