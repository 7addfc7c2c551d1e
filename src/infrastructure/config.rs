//! Configuration file management.
//!
//! Handles loading and creating the TOML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Breathwork Configuration
# Auto-generated - edit as needed. Command-line flags override these values.

[exercise]
# Preparation phase before the first cycle, in seconds (0 = skip)
preparation_secs = 0

# Breathing phase before every hold, in seconds
breathing_secs = 30

# One breath hold per cycle, in seconds (max 300 each)
hold_steps = [30, 60, 90]

# Countdown beeps start this many seconds before a phase ends (0 = off)
countdown_secs = 5

[display]
# "tui" (full screen with large digits) or "plain" (single line)
mode = "tui"

# Show the list of phases next to the timer
sidebar = true

[audio]
# "beep" (terminal bell), "system" (platform sounds) or "off"
mode = "beep"

[timing]
# Delay between clock polls in milliseconds (10-1000)
poll_interval_ms = 100
"#;

/// Load configuration from an explicit path, or from the default location.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
///
/// # Errors
/// Returns error if the file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(AppError::ConfigFile {
                message: format!("{} does not exist", path.display()),
            });
        }
        return load_config_from_file(path);
    }

    let config_path = AppConfig::default_config_path();
    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No configuration file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    let config = toml::from_str(&content).map_err(|e| AppError::ConfigFile {
        message: format!("Failed to parse {}: {e}", path.display()),
    })?;

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns whether a new file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Render a configuration as TOML.
///
/// # Errors
/// Returns error if serialization fails.
pub fn config_to_toml(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AppError::ConfigFile {
        message: format!("Failed to serialize config: {e}"),
    })
}

/// Get the path to the configuration file in use.
#[must_use]
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(AppConfig::default_config_path, Path::to_path_buf)
}
