//! Exercise execution loop.
//!
//! Polls the active phase on a single thread, asks the display to redraw
//! whenever the visible second changes, fires audio cues and advances the
//! exercise when a phase completes. Cancellation is cooperative: the token
//! is checked once per iteration and wakes the inter-poll sleep.

use std::io;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    AppError, Clock, Exercise, ExerciseSnapshot, PhaseOutline, PhaseState, Result, RunSummary,
};

/// Renders exercise progress. Only ever receives read-only projections.
pub trait Display {
    /// Called once before the first tick.
    fn begin(&mut self, snapshot: &ExerciseSnapshot) -> io::Result<()>;

    /// Redraw for a new elapsed second or a new phase.
    fn render(&mut self, snapshot: &ExerciseSnapshot) -> io::Result<()>;

    /// A phase finished and the next one started.
    fn transition(&mut self, from: &PhaseOutline, to: &PhaseOutline) -> io::Result<()>;

    /// The terminal marker was reached.
    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;

    /// The user aborted the run.
    fn interrupted(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Discrete audio triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    /// Once per second during the final countdown of a phase.
    CountdownBeep,
    /// Once per completed phase.
    PhaseTransition,
}

/// Plays audio cues. Failures are logged by the loop, never fatal.
pub trait Audio {
    fn cue(&mut self, cue: AudioCue) -> io::Result<()>;
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(RunSummary),
    Interrupted(RunSummary),
}

impl RunOutcome {
    #[must_use]
    pub const fn summary(&self) -> &RunSummary {
        match self {
            Self::Completed(summary) | Self::Interrupted(summary) => summary,
        }
    }
}

/// Loop tuning.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Sleep between polls; also the worst-case cancellation latency.
    pub poll_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Remembers what has already been shown or played.
#[derive(Debug, Default)]
struct CueTracker {
    last_frame: Option<(usize, u64)>,
    last_beep: Option<u64>,
}

impl CueTracker {
    fn needs_render(&mut self, index: usize, elapsed: u64) -> bool {
        let frame = Some((index, elapsed));
        if self.last_frame == frame {
            return false;
        }
        self.last_frame = frame;
        true
    }

    fn take_beep(&mut self, remaining: u64) -> bool {
        if self.last_beep == Some(remaining) {
            return false;
        }
        self.last_beep = Some(remaining);
        true
    }

    fn next_phase(&mut self) {
        self.last_beep = None;
    }
}

/// Run an exercise to completion or until `cancel` fires.
///
/// # Errors
/// Returns `AppError::State` if the exercise was already started or the
/// state machine is violated, and `AppError::Io` if the display fails.
pub async fn run_exercise<C, D, A>(
    exercise: &mut Exercise<C>,
    display: &mut D,
    audio: &mut A,
    options: &RunOptions,
    cancel: &CancellationToken,
) -> Result<RunOutcome>
where
    C: Clock,
    D: Display,
    A: Audio,
{
    let started = Instant::now();
    let threshold = exercise.config().countdown_threshold();
    let mut tracker = CueTracker::default();

    exercise.start()?;
    display.begin(&exercise.snapshot()).map_err(display_error)?;

    tracing::info!(
        phases = exercise.phase_count(),
        total_secs = exercise.total_seconds(),
        "Exercise started"
    );

    loop {
        if cancel.is_cancelled() {
            let summary = exercise.summary(started.elapsed().as_secs());
            let phase = exercise.current_phase();
            tracing::info!(
                index = exercise.current_index(),
                phase = %phase.kind(),
                elapsed = phase.elapsed(),
                remaining = phase.remaining(),
                "Exercise interrupted"
            );
            display.interrupted(&summary).map_err(display_error)?;
            return Ok(RunOutcome::Interrupted(summary));
        }

        let index = exercise.current_index();
        let previous = exercise.current_phase().state();
        let state = exercise.tick();
        // Frame and beep use the same clock reading the tick decided on
        let reading = exercise.current_phase().observed();
        let remaining = reading.remaining;

        if tracker.needs_render(index, reading.elapsed) {
            display
                .render(&exercise.snapshot_with(reading))
                .map_err(display_error)?;
        }

        if state == PhaseState::Countdown
            && (1..=threshold).contains(&remaining)
            && tracker.take_beep(remaining)
        {
            tracing::trace!(index, remaining, "Countdown beep");
            play(audio, AudioCue::CountdownBeep);
        }

        if state == PhaseState::Completed && previous != PhaseState::Completed {
            if exercise.is_finished() {
                let summary = exercise.summary(started.elapsed().as_secs());
                tracing::info!(
                    phases = summary.phases_completed,
                    elapsed_secs = summary.elapsed_seconds,
                    "Exercise complete"
                );
                display.finish(&summary).map_err(display_error)?;
                return Ok(RunOutcome::Completed(summary));
            }

            play(audio, AudioCue::PhaseTransition);

            let from = exercise.current_phase().outline();
            exercise.advance()?;
            tracker.next_phase();
            let to = exercise.current_phase().outline();

            tracing::debug!(
                index = exercise.current_index(),
                from = %from.kind,
                to = %to.kind,
                duration = to.duration,
                "Phase transition"
            );
            display.transition(&from, &to).map_err(display_error)?;

            // Draw the new phase right away
            continue;
        }

        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(options.poll_interval) => {}
        }
    }
}

fn play<A: Audio>(audio: &mut A, cue: AudioCue) {
    if let Err(e) = audio.cue(cue) {
        tracing::warn!(?cue, error = %e, "Audio cue failed");
    }
}

fn display_error(err: io::Error) -> AppError {
    AppError::io("Failed to write to terminal", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayMode, ExerciseConfig, ExerciseSettings, PhaseType, StateError};
    use crate::infrastructure::RuntimeClock;

    #[derive(Default)]
    struct RecordingDisplay {
        began: bool,
        renders: Vec<(usize, PhaseType, PhaseState, u64)>,
        transitions: Vec<(PhaseType, PhaseType)>,
        finished: Option<RunSummary>,
        interrupted: Option<RunSummary>,
        cancel_on_index: Option<(usize, CancellationToken)>,
    }

    impl Display for RecordingDisplay {
        fn begin(&mut self, _snapshot: &ExerciseSnapshot) -> io::Result<()> {
            self.began = true;
            Ok(())
        }

        fn render(&mut self, snapshot: &ExerciseSnapshot) -> io::Result<()> {
            self.renders
                .push((snapshot.index, snapshot.kind, snapshot.state, snapshot.remaining));
            if let Some((index, token)) = &self.cancel_on_index {
                if *index == snapshot.index {
                    token.cancel();
                }
            }
            Ok(())
        }

        fn transition(&mut self, from: &PhaseOutline, to: &PhaseOutline) -> io::Result<()> {
            self.transitions.push((from.kind, to.kind));
            Ok(())
        }

        fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
            self.finished = Some(*summary);
            Ok(())
        }

        fn interrupted(&mut self, summary: &RunSummary) -> io::Result<()> {
            self.interrupted = Some(*summary);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingAudio {
        cues: Vec<AudioCue>,
        broken: bool,
    }

    impl Audio for RecordingAudio {
        fn cue(&mut self, cue: AudioCue) -> io::Result<()> {
            self.cues.push(cue);
            if self.broken {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no sound device"));
            }
            Ok(())
        }
    }

    fn exercise(
        preparation: i64,
        breathing: i64,
        holds: &[i64],
        countdown: i64,
    ) -> Exercise<RuntimeClock> {
        let settings = ExerciseSettings {
            preparation_secs: preparation,
            breathing_secs: breathing,
            hold_steps: holds.to_vec(),
            countdown_secs: countdown,
        };
        let config = ExerciseConfig::new(&settings, DisplayMode::Plain).unwrap();
        Exercise::new(config, &RuntimeClock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let mut ex = exercise(0, 4, &[5], 3);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio::default();
        let cancel = CancellationToken::new();

        let outcome = run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &cancel,
        )
        .await
        .unwrap();

        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(outcome.summary(), &summary);
        assert!(summary.finished);
        assert_eq!(summary.phases_completed, 2);
        assert_eq!(summary.phases_total, 2);
        assert_eq!(summary.holds_completed, 1);
        assert_eq!(summary.elapsed_seconds, 9);
        assert!(ex.is_finished());

        use AudioCue::{CountdownBeep as B, PhaseTransition as T};
        assert_eq!(audio.cues, vec![B, B, B, T, B, B, B, T]);

        let remaining: Vec<u64> = display.renders.iter().map(|r| r.3).collect();
        assert_eq!(remaining, vec![4, 3, 2, 1, 0, 5, 4, 3, 2, 1, 0, 0]);
        assert_eq!(
            display.transitions,
            vec![
                (PhaseType::Breathe, PhaseType::Hold),
                (PhaseType::Hold, PhaseType::Complete),
            ]
        );
        assert!(display.began);
        assert_eq!(display.finished, Some(summary));
        assert!(display.interrupted.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_renders_start_with_preparation() {
        let mut ex = exercise(2, 1, &[1, 2], 0);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio::default();

        run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            display.renders.first(),
            Some(&(0, PhaseType::Preparation, PhaseState::InProgress, 2))
        );
        assert_eq!(
            display.renders.last(),
            Some(&(5, PhaseType::Complete, PhaseState::Completed, 0))
        );
        // One render per phase per visible second, phases in order
        let indices: Vec<usize> = display.renders.iter().map(|r| r.0).collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_threshold_only_transition_cues() {
        let mut ex = exercise(0, 3, &[4, 2], 0);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio::default();

        run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(audio.cues, vec![AudioCue::PhaseTransition; 4]);
        assert!(display.renders.iter().all(|r| r.2 != PhaseState::Countdown));
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_above_five_beeps_every_second() {
        let mut ex = exercise(0, 8, &[8], 8);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio::default();

        run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let beeps = audio
            .cues
            .iter()
            .filter(|c| **c == AudioCue::CountdownBeep)
            .count();
        assert_eq!(beeps, 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick() {
        let mut ex = exercise(0, 4, &[5], 3);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &cancel,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Interrupted(s) if !s.finished));
        assert!(display.renders.is_empty());
        assert!(display.interrupted.is_some());
        assert!(audio.cues.is_empty());
        assert_eq!(ex.current_index(), 0);
        assert_eq!(ex.current_phase().state(), PhaseState::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_freezes_state() {
        let mut ex = exercise(0, 2, &[5, 5], 0);
        let cancel = CancellationToken::new();
        let mut display = RecordingDisplay {
            cancel_on_index: Some((1, cancel.clone())),
            ..RecordingDisplay::default()
        };
        let mut audio = RecordingAudio::default();

        let outcome = run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &cancel,
        )
        .await
        .unwrap();

        let RunOutcome::Interrupted(summary) = outcome else {
            panic!("expected interruption, got {outcome:?}");
        };
        assert_eq!(summary.phases_completed, 1);
        assert!(!summary.finished);

        assert_eq!(ex.current_index(), 1);
        assert_eq!(ex.current_phase().kind(), PhaseType::Hold);
        assert_eq!(ex.current_phase().state(), PhaseState::InProgress);
        assert_eq!(ex.phases()[0].state(), PhaseState::Completed);
        assert_eq!(ex.phases()[2].state(), PhaseState::NotStarted);
        // The interrupted run cannot be advanced further
        assert!(matches!(
            ex.advance(),
            Err(StateError::PhaseNotCompleted { index: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_wakes_the_poll_sleep() {
        let mut ex = exercise(0, 30, &[30], 0);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio::default();
        let options = RunOptions {
            poll_interval: Duration::from_millis(1_000),
        };
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let outcome = run_exercise(&mut ex, &mut display, &mut audio, &options, &cancel)
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Interrupted(_)));
        assert!(!outcome.summary().finished);
        assert!(started.elapsed() < options.poll_interval);
        assert_eq!(display.renders.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_audio_failures_are_not_fatal() {
        let mut ex = exercise(0, 2, &[2], 2);
        let mut display = RecordingDisplay::default();
        let mut audio = RecordingAudio {
            broken: true,
            ..RecordingAudio::default()
        };

        let outcome = run_exercise(
            &mut ex,
            &mut display,
            &mut audio,
            &RunOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(_)));
        assert!(!audio.cues.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_starting_twice_is_a_state_error() {
        let mut ex = exercise(0, 2, &[2], 0);
        ex.start().unwrap();

        let err = run_exercise(
            &mut ex,
            &mut RecordingDisplay::default(),
            &mut RecordingAudio::default(),
            &RunOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::State(StateError::AlreadyStarted)));
    }

    #[test]
    fn test_cue_tracker() {
        let mut tracker = CueTracker::default();
        assert!(tracker.needs_render(0, 0));
        assert!(!tracker.needs_render(0, 0));
        assert!(tracker.needs_render(0, 1));
        assert!(tracker.needs_render(1, 1));

        assert!(tracker.take_beep(3));
        assert!(!tracker.take_beep(3));
        assert!(tracker.take_beep(2));
        tracker.next_phase();
        assert!(tracker.take_beep(2));
    }
}
