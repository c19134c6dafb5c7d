//! Host time adapter.
//!
//! Monotonic time for busy-poll measurements, backed by
//! `std::time::Instant`.

use core::time::Duration;
use std::time::Instant;

use crate::ports::Clock;

/// [`Clock`] measuring from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
