//! Domain-level error types for breathwork.
//!
//! All errors are typed with `thiserror`. Configuration problems are
//! user-facing; state errors indicate a bug in the orchestration.

use thiserror::Error;

use super::models::PhaseState;

/// Invalid exercise configuration, raised before any phase is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No hold steps were configured.
    #[error("Hold steps cannot be empty. Provide at least one hold duration (e.g. '30,60,90')")]
    EmptyHoldSteps,

    /// A hold step is zero or negative.
    #[error("All hold steps must be positive. Step {step} has invalid duration: {value}")]
    InvalidHoldStep { step: usize, value: i64 },

    /// A duration that must be positive is not.
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: i64 },

    /// A duration that must be non-negative is negative.
    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    /// A duration exceeds the supported ceiling.
    #[error("{field} cannot exceed {max} seconds (got {value})")]
    TooLong {
        field: &'static str,
        value: i64,
        max: i64,
    },

    /// A comma-separated duration list could not be parsed.
    #[error("Invalid duration list '{input}': {reason}")]
    InvalidList { input: String, reason: String },

    /// Poll interval outside the supported range.
    #[error("Poll interval must be between {min} and {max} ms (got {value})")]
    PollInterval { value: u64, min: u64, max: u64 },
}

/// An invalid state-machine transition was requested.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// The phase state machine does not allow this edge.
    #[error("Cannot move phase from {from} to {to}")]
    InvalidTransition { from: PhaseState, to: PhaseState },

    /// The exercise was started twice.
    #[error("Exercise already started")]
    AlreadyStarted,

    /// `advance` was called before the active phase finished.
    #[error("Phase {index} is {state}, not completed")]
    PhaseNotCompleted { index: usize, state: PhaseState },

    /// `advance` was called on the terminal marker.
    #[error("Exercise is already at its final phase")]
    AlreadyAtEnd,
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Exercise configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal state machine violation.
    #[error("Internal state error: {0}")]
    State(#[from] StateError),

    /// Configuration file could not be used.
    #[error("Configuration file error: {message}")]
    ConfigFile { message: String },

    /// A command-line value was not recognised.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// JSON serialization failed.
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Create a JSON error.
    pub fn json(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
