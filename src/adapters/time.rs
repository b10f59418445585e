//! Clock adapters.
//!
//! - [`SystemClock`]: `std::time::Instant`, for real-time operation.
//! - [`SimClock`]: advanced by hand, for replay and tests.

use core::cell::Cell;
use core::time::Duration;
use std::time::Instant;

use crate::app::ports::ClockPort;

/// Monotonic wall-clock time since construction.
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Manually stepped clock.
#[derive(Debug, Default)]
pub struct SimClock {
    now: Cell<Duration>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `dt`.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get().saturating_add(dt));
    }
}

impl ClockPort for SimClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
