//! Domain models for breathing exercises.
//!
//! Closed enums for phase kinds and states, plus the read-only projections
//! handed to renderers.

use serde::{Deserialize, Serialize};

/// Kind of phase in a breathing exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseType {
    /// Optional settling-in period before the first cycle.
    Preparation,
    /// Breathing period preceding each hold.
    Breathe,
    /// Breath hold.
    Hold,
    /// Zero-length terminal marker.
    Complete,
}

impl PhaseType {
    /// Short instruction shown to the user.
    #[must_use]
    pub const fn instruction(self) -> &'static str {
        match self {
            Self::Preparation => "Prepare",
            Self::Breathe => "Breathe",
            Self::Hold => "Hold",
            Self::Complete => "Complete",
        }
    }

    /// Whether this is the synthetic end-of-exercise marker.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for PhaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preparation => write!(f, "preparation"),
            Self::Breathe => write!(f, "breathe"),
            Self::Hold => write!(f, "hold"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Progress of a single phase, ordered by progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    NotStarted,
    InProgress,
    Countdown,
    Completed,
}

impl PhaseState {
    /// Whether the state machine has an edge from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::InProgress)
                | (Self::InProgress, Self::Countdown | Self::Completed)
                | (Self::Countdown, Self::Completed)
        )
    }
}

impl std::fmt::Display for PhaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::InProgress => write!(f, "in progress"),
            Self::Countdown => write!(f, "countdown"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// How the exercise is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Full-screen box with ASCII-art digits and a progress sidebar.
    #[default]
    Tui,
    /// Single updating line, suitable for pipes and dumb terminals.
    Plain,
}

/// Which audio backend plays the cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// Terminal bell.
    #[default]
    Beep,
    /// Platform sound player, falling back to the bell.
    System,
    /// No audio.
    Off,
}

impl std::str::FromStr for AudioMode {
    type Err = String;

    // Case-sensitive on purpose: `Beep` or `OFF` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beep" => Ok(Self::Beep),
            "system" => Ok(Self::System),
            "off" => Ok(Self::Off),
            _ => Err(format!(
                "Invalid audio option '{s}'. Must be exactly 'beep', 'system' or 'off'"
            )),
        }
    }
}

/// Static description of one phase, used for sidebars and plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseOutline {
    pub kind: PhaseType,
    pub duration: u64,
    pub state: PhaseState,
}

impl PhaseOutline {
    /// Label such as `Hold (60s)`; the terminal marker has no duration.
    #[must_use]
    pub fn label(&self) -> String {
        if self.kind.is_terminal() {
            self.kind.instruction().to_string()
        } else {
            format!("{} ({}s)", self.kind.instruction(), self.duration)
        }
    }
}

/// State and time of one phase, taken from a single clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReading {
    pub state: PhaseState,
    pub elapsed: u64,
    pub remaining: u64,
}

/// Read-only view of the exercise at one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseSnapshot {
    /// Index of the active phase.
    pub index: usize,
    /// Total number of phases, terminal marker included.
    pub total: usize,
    pub kind: PhaseType,
    pub state: PhaseState,
    pub elapsed: u64,
    pub remaining: u64,
    pub duration: u64,
    /// Every phase in order, for progress displays.
    pub phases: Vec<PhaseOutline>,
}

impl ExerciseSnapshot {
    /// Fraction of phases already completed, as a percentage (0-100).
    #[must_use]
    pub fn progress_percent(&self) -> u64 {
        let done = self
            .phases
            .iter()
            .filter(|p| p.state == PhaseState::Completed)
            .count() as u64;
        if self.total == 0 {
            return 100;
        }
        (done * 100) / self.total as u64
    }
}

/// Outcome numbers reported when an exercise ends or is interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Real phases (terminal marker excluded) that reached Completed.
    pub phases_completed: usize,
    /// Real phases in the exercise.
    pub phases_total: usize,
    /// Hold steps that reached Completed.
    pub holds_completed: usize,
    /// Sum of all planned phase durations.
    pub planned_seconds: u64,
    /// Sum of all planned hold durations.
    pub hold_seconds: u64,
    /// Sum of the durations of holds that reached Completed.
    pub held_seconds: u64,
    /// Wall time spent in the run loop.
    pub elapsed_seconds: u64,
    /// Whether the terminal marker was reached.
    pub finished: bool,
}
