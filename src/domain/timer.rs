//! Drift-free countdown timer.
//!
//! A timer stores only the instant it was started; elapsed and remaining
//! time are derived from the clock on every query, so late polls never
//! accumulate error.

use std::time::Instant;

/// Source of monotonic instants.
pub trait Clock: Clone {
    /// Current reading. Must never go backwards.
    fn now(&self) -> Instant;
}

/// Whole-second countdown over a `Clock`.
#[derive(Debug, Clone)]
pub struct Timer<C> {
    clock: C,
    duration: u64,
    started_at: Option<Instant>,
}

impl<C: Clock> Timer<C> {
    /// Create a stopped timer. Any duration is accepted, including zero.
    pub const fn new(duration: u64, clock: C) -> Self {
        Self {
            clock,
            duration,
            started_at: None,
        }
    }

    /// Capture the reference instant. Calling again restarts from zero.
    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now());
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub const fn duration(&self) -> u64 {
        self.duration
    }

    /// Read the clock once. Pass the result to the `*_at` queries to get
    /// answers that agree with each other.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Whole seconds since `start`, floored. Zero before the timer starts.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_at(self.now())
    }

    /// Seconds left, never below zero.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_at(self.now())
    }

    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> u64 {
        self.started_at
            .map_or(0, |start| now.saturating_duration_since(start).as_secs())
    }

    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> u64 {
        self.duration.saturating_sub(self.elapsed_at(now))
    }

    /// True once started and the full duration has elapsed at `now`.
    #[must_use]
    pub fn is_complete_at(&self, now: Instant) -> bool {
        self.is_started() && self.elapsed_at(now) >= self.duration
    }

    /// True while `0 < remaining <= threshold` on a running timer.
    #[must_use]
    pub fn is_in_countdown_at(&self, threshold: u64, now: Instant) -> bool {
        if !self.is_started() || self.is_complete_at(now) {
            return false;
        }
        let remaining = self.remaining_at(now);
        remaining > 0 && remaining <= threshold
    }
}
