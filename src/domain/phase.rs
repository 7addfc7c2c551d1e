//! A single timed phase and its forward-only state machine.
//!
//! ```text
//! NotStarted --start--> InProgress --tick--> Countdown --tick--> Completed
//!                            \_____________tick____________________/
//! ```
//!
//! `InProgress -> Completed` is taken when there is no countdown window
//! (threshold 0) or when the first tick after the window already finds the
//! timer expired.

use std::time::Instant;

use super::error::StateError;
use super::models::{PhaseOutline, PhaseReading, PhaseState, PhaseType};
use super::timer::{Clock, Timer};

/// One timed unit of exercise work. Owns its timer.
#[derive(Debug, Clone)]
pub struct Phase<C> {
    kind: PhaseType,
    countdown_threshold: u64,
    timer: Timer<C>,
    state: PhaseState,
    observed: PhaseReading,
}

impl<C: Clock> Phase<C> {
    pub const fn new(kind: PhaseType, duration: u64, countdown_threshold: u64, clock: C) -> Self {
        Self {
            kind,
            countdown_threshold,
            timer: Timer::new(duration, clock),
            state: PhaseState::NotStarted,
            observed: PhaseReading {
                state: PhaseState::NotStarted,
                elapsed: 0,
                remaining: duration,
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PhaseType {
        self.kind
    }

    #[must_use]
    pub const fn duration(&self) -> u64 {
        self.timer.duration()
    }

    #[must_use]
    pub const fn state(&self) -> PhaseState {
        self.state
    }

    /// Begin the phase and its timer.
    ///
    /// # Errors
    /// Returns `StateError::InvalidTransition` unless the phase is `NotStarted`.
    pub fn start(&mut self) -> Result<(), StateError> {
        self.transition(PhaseState::InProgress)?;
        self.timer.start();
        self.observed = self.reading();
        Ok(())
    }

    /// Re-evaluate the state against the timer and return it.
    ///
    /// Repeated calls within the same elapsed second yield the same state.
    /// The clock is read once; `observed` returns that reading.
    pub fn tick(&mut self) -> PhaseState {
        let now = self.timer.now();
        let next = match self.state {
            PhaseState::NotStarted | PhaseState::Completed => None,
            PhaseState::InProgress | PhaseState::Countdown if self.timer.is_complete_at(now) => {
                Some(PhaseState::Completed)
            }
            PhaseState::InProgress
                if self.timer.is_in_countdown_at(self.countdown_threshold, now) =>
            {
                Some(PhaseState::Countdown)
            }
            PhaseState::InProgress | PhaseState::Countdown => None,
        };

        if let Some(next) = next {
            debug_assert!(self.state.can_transition_to(next));
            self.state = next;
        }
        self.observed = self.reading_at(now);
        self.state
    }

    /// State and time as seen by the last `tick` (or `start`).
    ///
    /// A `Countdown` reading always carries a non-zero `remaining` and a
    /// `Completed` reading carries zero.
    #[must_use]
    pub const fn observed(&self) -> PhaseReading {
        self.observed
    }

    /// Current state and time from a single clock reading, without ticking.
    #[must_use]
    pub fn reading(&self) -> PhaseReading {
        self.reading_at(self.timer.now())
    }

    fn reading_at(&self, now: Instant) -> PhaseReading {
        PhaseReading {
            state: self.state,
            elapsed: self.timer.elapsed_at(now),
            remaining: self.timer.remaining_at(now),
        }
    }

    /// Whole seconds since the phase started (0 before start).
    #[must_use]
    pub fn elapsed(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    /// Seconds left (full duration before start).
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.timer.remaining_seconds()
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.state, PhaseState::Completed)
    }

    #[must_use]
    pub const fn outline(&self) -> PhaseOutline {
        PhaseOutline {
            kind: self.kind,
            duration: self.timer.duration(),
            state: self.state,
        }
    }

    fn transition(&mut self, next: PhaseState) -> Result<(), StateError> {
        if !self.state.can_transition_to(next) {
            return Err(StateError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::timer::testing::ManualClock;

    fn phase(duration: u64, threshold: u64) -> (Phase<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (
            Phase::new(PhaseType::Hold, duration, threshold, clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_not_started_reports_full_duration() {
        let (mut p, clock) = phase(10, 3);
        clock.advance_secs(30);
        assert_eq!(p.tick(), PhaseState::NotStarted);
        assert_eq!(p.remaining(), 10);
        assert_eq!(p.elapsed(), 0);
    }

    #[test]
    fn test_full_progression() {
        let (mut p, clock) = phase(10, 3);
        p.start().unwrap();
        assert_eq!(p.tick(), PhaseState::InProgress);

        clock.advance_secs(7);
        assert_eq!(p.tick(), PhaseState::Countdown);
        assert_eq!(p.remaining(), 3);

        clock.advance_secs(2);
        assert_eq!(p.tick(), PhaseState::Countdown);

        clock.advance_secs(1);
        assert_eq!(p.tick(), PhaseState::Completed);
        assert!(p.is_completed());
    }

    #[test]
    fn test_start_twice_fails_without_mutation() {
        let (mut p, clock) = phase(10, 3);
        p.start().unwrap();
        clock.advance_secs(4);

        let err = p.start().unwrap_err();
        assert_eq!(
            err,
            StateError::InvalidTransition {
                from: PhaseState::InProgress,
                to: PhaseState::InProgress,
            }
        );
        assert_eq!(p.state(), PhaseState::InProgress);
        // Timer was not restarted
        assert_eq!(p.elapsed(), 4);
    }

    #[test]
    fn test_complete_from_not_started_rejected() {
        let (mut p, _clock) = phase(10, 3);
        let err = p.transition(PhaseState::Completed).unwrap_err();
        assert!(matches!(
            err,
            StateError::InvalidTransition {
                from: PhaseState::NotStarted,
                ..
            }
        ));
        assert_eq!(p.state(), PhaseState::NotStarted);
    }

    #[test]
    fn test_completed_is_terminal() {
        let (mut p, clock) = phase(1, 0);
        p.start().unwrap();
        clock.advance_secs(1);
        assert_eq!(p.tick(), PhaseState::Completed);

        for target in [
            PhaseState::NotStarted,
            PhaseState::InProgress,
            PhaseState::Countdown,
            PhaseState::Completed,
        ] {
            assert!(p.transition(target).is_err());
        }
        assert!(p.start().is_err());
        assert_eq!(p.state(), PhaseState::Completed);
    }

    #[test]
    fn test_duration_equal_to_threshold_counts_down_immediately() {
        let (mut p, _clock) = phase(5, 5);
        p.start().unwrap();
        assert_eq!(p.tick(), PhaseState::Countdown);
        assert_eq!(p.remaining(), 5);
    }

    #[test]
    fn test_zero_threshold_skips_countdown() {
        let (mut p, clock) = phase(3, 0);
        p.start().unwrap();

        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(p.tick());
            clock.advance_millis(500);
        }

        assert!(!seen.contains(&PhaseState::Countdown));
        assert_eq!(seen.last(), Some(&PhaseState::Completed));
    }

    #[test]
    fn test_late_first_tick_goes_straight_to_completed() {
        let (mut p, clock) = phase(10, 3);
        p.start().unwrap();
        clock.advance_secs(12);
        assert_eq!(p.tick(), PhaseState::Completed);
    }

    #[test]
    fn test_tick_is_idempotent_within_a_second() {
        let (mut p, clock) = phase(10, 3);
        p.start().unwrap();
        clock.advance_millis(7_100);

        let first = (p.tick(), p.remaining());
        clock.advance_millis(300);
        let second = (p.tick(), p.remaining());
        let third = (p.tick(), p.remaining());

        assert_eq!(first, (PhaseState::Countdown, 3));
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn test_states_never_decrease() {
        for threshold in [0, 1, 3, 10, 20] {
            let (mut p, clock) = phase(10, threshold);
            let mut last = p.state();
            let _ = p.start();
            for step in 0..60 {
                if step % 7 == 0 {
                    // Stray start calls must not move the state backwards
                    let _ = p.start();
                }
                let state = p.tick();
                assert!(state >= last, "{last} -> {state} at threshold {threshold}");
                last = state;
                clock.advance_millis(250);
            }
            assert_eq!(last, PhaseState::Completed);
        }
    }

    #[test]
    fn test_zero_duration_marker_completes_on_first_tick() {
        let clock = ManualClock::new();
        let mut marker = Phase::new(PhaseType::Complete, 0, 5, clock);
        marker.start().unwrap();
        assert_eq!(marker.tick(), PhaseState::Completed);
    }

    /// Clock that moves forward a little on every reading.
    #[derive(Clone)]
    struct SteppingClock {
        inner: ManualClock,
        step: std::time::Duration,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> std::time::Instant {
            let now = self.inner.now();
            self.inner.advance(self.step);
            now
        }
    }

    #[test]
    fn test_observed_reading_is_self_consistent() {
        let clock = SteppingClock {
            inner: ManualClock::new(),
            step: std::time::Duration::from_millis(370),
        };
        let mut p = Phase::new(PhaseType::Hold, 6, 3, clock);
        p.start().unwrap();

        let mut remaining_in_countdown = Vec::new();
        loop {
            p.tick();
            let reading = p.observed();
            match reading.state {
                PhaseState::Countdown => {
                    assert!((1..=3).contains(&reading.remaining), "{reading:?}");
                    remaining_in_countdown.push(reading.remaining);
                }
                PhaseState::Completed => {
                    assert_eq!(reading.remaining, 0);
                    break;
                }
                PhaseState::InProgress => assert!(reading.remaining > 3, "{reading:?}"),
                PhaseState::NotStarted => unreachable!(),
            }
        }
        remaining_in_countdown.dedup();
        assert_eq!(remaining_in_countdown, vec![3, 2, 1]);
    }
}
