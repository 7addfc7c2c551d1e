//! Domain layer - core exercise logic and types.
//!
//! This layer contains the timer, the phase state machine and the exercise
//! sequence, without any terminal or audio I/O.

pub mod config;
pub mod error;
pub mod exercise;
pub mod models;
pub mod phase;
pub mod timer;

pub use config::{parse_duration_list, AppConfig, ExerciseConfig, ExerciseSettings};
pub use error::{AppError, ConfigError, Result, StateError};
pub use exercise::Exercise;
pub use models::{
    AudioMode, DisplayMode, ExerciseSnapshot, PhaseOutline, PhaseState, PhaseType, RunSummary,
};
pub use timer::Clock;
