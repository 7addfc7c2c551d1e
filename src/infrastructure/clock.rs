//! Monotonic clock backed by the tokio runtime.

use std::time::Instant;

use crate::domain::Clock;

/// Reads tokio's monotonic clock.
///
/// Identical to `Instant::now()` in production; under a paused test runtime
/// it follows virtual time, so the run loop and the timers agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeClock;

impl Clock for RuntimeClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
