//! Exercise orchestration.
//!
//! Builds the full phase sequence once from an `ExerciseConfig` and walks it
//! forward. The sequence always ends with a zero-length `Complete` marker,
//! so there is exactly one active phase at every point of the run.

use super::config::ExerciseConfig;
use super::error::StateError;
use super::models::{ExerciseSnapshot, PhaseReading, PhaseState, PhaseType, RunSummary};
use super::phase::Phase;
use super::timer::Clock;

/// Generate the phase sequence for a configuration.
///
/// Optional preparation first, then a breathe/hold pair per hold step,
/// then the terminal marker.
pub fn generate_phases<C: Clock>(config: &ExerciseConfig, clock: &C) -> Vec<Phase<C>> {
    let threshold = config.countdown_threshold();
    let mut phases = Vec::with_capacity(config.hold_steps().len() * 2 + 2);

    if config.preparation() > 0 {
        phases.push(Phase::new(
            PhaseType::Preparation,
            config.preparation(),
            threshold,
            clock.clone(),
        ));
    }

    for &hold in config.hold_steps() {
        phases.push(Phase::new(
            PhaseType::Breathe,
            config.breathing(),
            threshold,
            clock.clone(),
        ));
        phases.push(Phase::new(PhaseType::Hold, hold, threshold, clock.clone()));
    }

    phases.push(Phase::new(PhaseType::Complete, 0, threshold, clock.clone()));
    phases
}

/// A breathing exercise in progress.
#[derive(Debug)]
pub struct Exercise<C> {
    config: ExerciseConfig,
    phases: Vec<Phase<C>>,
    active: usize,
}

impl<C: Clock> Exercise<C> {
    pub fn new(config: ExerciseConfig, clock: &C) -> Self {
        let phases = generate_phases(&config, clock);
        Self {
            config,
            phases,
            active: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase<C>] {
        &self.phases
    }

    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.active
    }

    /// The active phase; the terminal marker once every real phase is done.
    #[must_use]
    pub fn current_phase(&self) -> &Phase<C> {
        &self.phases[self.active]
    }

    /// Start the first phase.
    ///
    /// # Errors
    /// Returns `StateError::AlreadyStarted` on a second call.
    pub fn start(&mut self) -> Result<(), StateError> {
        if self.active != 0 || self.phases[0].state() != PhaseState::NotStarted {
            return Err(StateError::AlreadyStarted);
        }
        self.phases[0].start()
    }

    /// Tick the active phase and return its state.
    pub fn tick(&mut self) -> PhaseState {
        self.phases[self.active].tick()
    }

    /// Move to and start the next phase.
    ///
    /// # Errors
    /// Returns `StateError::PhaseNotCompleted` if the active phase has not
    /// finished, or `StateError::AlreadyAtEnd` on the terminal marker. The
    /// active index is unchanged on error.
    pub fn advance(&mut self) -> Result<(), StateError> {
        let current = &self.phases[self.active];
        if !current.is_completed() {
            return Err(StateError::PhaseNotCompleted {
                index: self.active,
                state: current.state(),
            });
        }
        if self.is_at_terminal() {
            return Err(StateError::AlreadyAtEnd);
        }

        self.phases[self.active + 1].start()?;
        self.active += 1;
        Ok(())
    }

    /// True once the terminal marker itself has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_at_terminal() && self.current_phase().is_completed()
    }

    fn is_at_terminal(&self) -> bool {
        self.active + 1 == self.phases.len()
    }

    /// Sum of every phase's planned duration.
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.phases.iter().map(Phase::duration).sum()
    }

    /// Sum of planned hold durations.
    #[must_use]
    pub fn hold_seconds(&self) -> u64 {
        self.config.hold_steps().iter().sum()
    }

    /// Read-only projection for renderers.
    #[must_use]
    pub fn snapshot(&self) -> ExerciseSnapshot {
        self.snapshot_with(self.current_phase().reading())
    }

    /// Projection built from a reading already taken, usually `observed()`
    /// of the active phase after a tick.
    #[must_use]
    pub fn snapshot_with(&self, reading: PhaseReading) -> ExerciseSnapshot {
        let phase = self.current_phase();
        ExerciseSnapshot {
            index: self.active,
            total: self.phases.len(),
            kind: phase.kind(),
            state: reading.state,
            elapsed: reading.elapsed,
            remaining: reading.remaining,
            duration: phase.duration(),
            phases: self.phases.iter().map(Phase::outline).collect(),
        }
    }

    /// Totals for the end-of-run report.
    #[must_use]
    pub fn summary(&self, elapsed_seconds: u64) -> RunSummary {
        let real = || self.phases.iter().filter(|p| !p.kind().is_terminal());
        let held = || real().filter(|p| p.kind() == PhaseType::Hold && p.is_completed());
        RunSummary {
            phases_completed: real().filter(|p| p.is_completed()).count(),
            phases_total: real().count(),
            holds_completed: held().count(),
            planned_seconds: self.total_seconds(),
            hold_seconds: self.hold_seconds(),
            held_seconds: held().map(Phase::duration).sum(),
            elapsed_seconds,
            finished: self.is_finished(),
        }
    }
}
