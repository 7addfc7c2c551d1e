//! Exercise configuration.
//!
//! `AppConfig` mirrors the TOML file and keeps raw, signed values so that
//! bad input is reported by validation rather than by the parser.
//! `ExerciseConfig` is the validated, immutable form the core consumes.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::models::{AudioMode, DisplayMode};

/// Upper bound for any single phase, in seconds.
pub const MAX_PHASE_SECS: i64 = 300;

/// Accepted range for the poll interval, in milliseconds.
pub const POLL_INTERVAL_RANGE_MS: (u64, u64) = (10, 1_000);

/// Raw exercise durations as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSettings {
    /// Preparation phase length in seconds (0 skips it).
    #[serde(default)]
    pub preparation_secs: i64,

    /// Breathing phase length before every hold.
    #[serde(default = "default_breathing")]
    pub breathing_secs: i64,

    /// One hold per cycle, in order.
    #[serde(default = "default_hold_steps")]
    pub hold_steps: Vec<i64>,

    /// Countdown cues start this many seconds before a phase ends.
    #[serde(default = "default_countdown")]
    pub countdown_secs: i64,
}

impl Default for ExerciseSettings {
    fn default() -> Self {
        Self {
            preparation_secs: 0,
            breathing_secs: default_breathing(),
            hold_steps: default_hold_steps(),
            countdown_secs: default_countdown(),
        }
    }
}

const fn default_breathing() -> i64 {
    30
}

fn default_hold_steps() -> Vec<i64> {
    vec![30, 60, 90]
}

const fn default_countdown() -> i64 {
    5
}

/// Rendering preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub mode: DisplayMode,

    /// Show the phase list next to the timer (TUI only).
    #[serde(default = "default_sidebar")]
    pub sidebar: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            sidebar: default_sidebar(),
        }
    }
}

const fn default_sidebar() -> bool {
    true
}

/// Audio preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default)]
    pub mode: AudioMode,
}

/// Loop timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Sleep between polls of the active phase.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

const fn default_poll_interval() -> u64 {
    100
}

impl TimingSettings {
    /// Validated poll interval.
    ///
    /// # Errors
    /// Returns `ConfigError::PollInterval` outside 10-1000 ms.
    pub const fn poll_interval(&self) -> Result<Duration, ConfigError> {
        let (min, max) = POLL_INTERVAL_RANGE_MS;
        if self.poll_interval_ms < min || self.poll_interval_ms > max {
            return Err(ConfigError::PollInterval {
                value: self.poll_interval_ms,
                min,
                max,
            });
        }
        Ok(Duration::from_millis(self.poll_interval_ms))
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub exercise: ExerciseSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub audio: AudioSettings,

    #[serde(default)]
    pub timing: TimingSettings,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".breathwork")
    }

    /// Get the default config file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Validate the exercise section into the form the core consumes.
    ///
    /// # Errors
    /// Returns the first `ConfigError` found.
    pub fn exercise_config(&self) -> Result<ExerciseConfig, ConfigError> {
        ExerciseConfig::new(&self.exercise, self.display.mode)
    }
}

/// Validated exercise configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseConfig {
    preparation: u64,
    breathing: u64,
    hold_steps: Vec<u64>,
    countdown_threshold: u64,
    display_mode: DisplayMode,
}

impl ExerciseConfig {
    /// Validate raw settings.
    ///
    /// # Errors
    /// Fails on an empty hold list, non-positive holds or breathing,
    /// negative preparation or countdown, or any phase above 300 seconds.
    pub fn new(
        settings: &ExerciseSettings,
        display_mode: DisplayMode,
    ) -> Result<Self, ConfigError> {
        if settings.hold_steps.is_empty() {
            return Err(ConfigError::EmptyHoldSteps);
        }

        let mut hold_steps = Vec::with_capacity(settings.hold_steps.len());
        for (i, &value) in settings.hold_steps.iter().enumerate() {
            if value <= 0 {
                return Err(ConfigError::InvalidHoldStep { step: i + 1, value });
            }
            hold_steps.push(at_most("Hold step", value)?);
        }

        if settings.breathing_secs <= 0 {
            return Err(ConfigError::NonPositive {
                field: "Breathing duration",
                value: settings.breathing_secs,
            });
        }
        let breathing = at_most("Breathing duration", settings.breathing_secs)?;

        let preparation = at_most("Preparation duration", settings.preparation_secs)?;

        let countdown_threshold = non_negative("Countdown threshold", settings.countdown_secs)?;

        Ok(Self {
            preparation,
            breathing,
            hold_steps,
            countdown_threshold,
            display_mode,
        })
    }

    #[must_use]
    pub const fn preparation(&self) -> u64 {
        self.preparation
    }

    #[must_use]
    pub const fn breathing(&self) -> u64 {
        self.breathing
    }

    #[must_use]
    pub fn hold_steps(&self) -> &[u64] {
        &self.hold_steps
    }

    #[must_use]
    pub const fn countdown_threshold(&self) -> u64 {
        self.countdown_threshold
    }

    #[must_use]
    pub const fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    u64::try_from(value).map_err(|_| ConfigError::Negative { field, value })
}

fn at_most(field: &'static str, value: i64) -> Result<u64, ConfigError> {
    if value > MAX_PHASE_SECS {
        return Err(ConfigError::TooLong {
            field,
            value,
            max: MAX_PHASE_SECS,
        });
    }
    non_negative(field, value)
}

/// Parse a comma-separated list of seconds such as `"30, 60,90"`.
///
/// Values are not range-checked here; `ExerciseConfig::new` does that.
///
/// # Errors
/// Returns `ConfigError::EmptyHoldSteps` for blank input and
/// `ConfigError::InvalidList` for empty or non-numeric entries.
pub fn parse_duration_list(input: &str) -> Result<Vec<i64>, ConfigError> {
    if input.trim().is_empty() {
        return Err(ConfigError::EmptyHoldSteps);
    }

    input
        .split(',')
        .enumerate()
        .map(|(i, part)| {
            let part = part.trim();
            if part.is_empty() {
                return Err(ConfigError::InvalidList {
                    input: input.to_string(),
                    reason: format!("empty value at position {}", i + 1),
                });
            }
            part.parse::<i64>().map_err(|_| ConfigError::InvalidList {
                input: input.to_string(),
                reason: format!("'{part}' is not a whole number of seconds"),
            })
        })
        .collect()
}
