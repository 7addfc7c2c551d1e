//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{parse_duration_list, AppConfig, AppError, AudioMode, DisplayMode, Result};

/// Breathwork - breath-hold training timer for the terminal.
///
/// Alternates a fixed breathing phase with increasing breath holds:
/// breathwork -b 30 -H 30,60,90 | breathwork plan | breathwork config init
#[derive(Parser, Debug)]
#[command(name = "breathwork")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ~/.breathwork/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub exercise: ExerciseArgs,

    /// Defaults to `run`.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for the configuration file.
#[derive(Args, Debug, Default)]
pub struct ExerciseArgs {
    /// Preparation phase in seconds (0 to skip).
    #[arg(
        short,
        long,
        global = true,
        allow_negative_numbers = true,
        value_name = "SECS"
    )]
    pub preparation: Option<i64>,

    /// Breathing phase before each hold, in seconds.
    #[arg(
        short = 'b',
        long = "breathe",
        global = true,
        allow_negative_numbers = true,
        value_name = "SECS"
    )]
    pub breathe: Option<i64>,

    /// Breath holds in seconds, comma-separated (e.g. "30,60,90").
    #[arg(
        short = 'H',
        long,
        global = true,
        allow_hyphen_values = true,
        value_name = "LIST"
    )]
    pub holds: Option<String>,

    /// Start countdown beeps this many seconds before a phase ends (0 = off).
    #[arg(
        short,
        long,
        global = true,
        allow_negative_numbers = true,
        value_name = "SECS"
    )]
    pub countdown: Option<i64>,

    /// Full-screen display with large digits.
    #[arg(long, global = true)]
    pub tui: bool,

    /// Single-line display (wins over --tui).
    #[arg(long, global = true)]
    pub plain: bool,

    /// Audio cues: beep, system, or off.
    #[arg(short, long, global = true, value_name = "MODE")]
    pub audio: Option<String>,

    /// Hide the phase list next to the timer.
    #[arg(long, global = true)]
    pub no_sidebar: bool,
}

impl ExerciseArgs {
    /// Apply command-line values on top of a loaded configuration.
    ///
    /// Values are copied as given; range checks happen when the exercise
    /// configuration is built.
    ///
    /// # Errors
    /// Returns error if the hold list or audio mode cannot be parsed.
    pub fn apply(&self, config: &mut AppConfig) -> Result<()> {
        if let Some(secs) = self.preparation {
            config.exercise.preparation_secs = secs;
        }
        if let Some(secs) = self.breathe {
            config.exercise.breathing_secs = secs;
        }
        if let Some(holds) = &self.holds {
            config.exercise.hold_steps = parse_duration_list(holds)?;
        }
        if let Some(secs) = self.countdown {
            config.exercise.countdown_secs = secs;
        }

        if self.plain {
            config.display.mode = DisplayMode::Plain;
        } else if self.tui {
            config.display.mode = DisplayMode::Tui;
        }
        if self.no_sidebar {
            config.display.sidebar = false;
        }

        if let Some(audio) = &self.audio {
            config.audio.mode = audio
                .parse::<AudioMode>()
                .map_err(|message| AppError::InvalidArgument { message })?;
        }

        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the breathing exercise.
    Run,

    /// Show the phase sequence and total time without running it.
    Plan {
        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the configuration file path.
    Path,
    /// Write a default configuration file if none exists.
    Init,
    /// Print the effective configuration (file plus flags).
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("breathwork").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_to_run() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(cli.exercise.holds.is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = parse(&["-b", "20", "-H", "10,20", "-c", "3", "--plain", "-a", "off"]);
        let mut config = AppConfig::default();
        cli.exercise.apply(&mut config).unwrap();

        assert_eq!(config.exercise.breathing_secs, 20);
        assert_eq!(config.exercise.hold_steps, vec![10, 20]);
        assert_eq!(config.exercise.countdown_secs, 3);
        assert_eq!(config.display.mode, DisplayMode::Plain);
        assert_eq!(config.audio.mode, AudioMode::Off);
        assert!(config.display.sidebar);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["plan", "--format", "json", "-H", "5", "-v"]);
        assert!(matches!(cli.command, Some(Commands::Plan { ref format }) if format == "json"));
        assert_eq!(cli.exercise.holds.as_deref(), Some("5"));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_negative_values_reach_validation() {
        let cli = parse(&["-b", "-5"]);
        let mut config = AppConfig::default();
        cli.exercise.apply(&mut config).unwrap();
        assert!(matches!(
            config.exercise_config(),
            Err(ConfigError::NonPositive { value: -5, .. })
        ));
    }

    #[test]
    fn test_bad_audio_mode() {
        let cli = parse(&["--audio", "loud"]);
        let err = cli.exercise.apply(&mut AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { .. }));
    }

    #[test]
    fn test_bad_hold_list() {
        let cli = parse(&["-H", "30,abc"]);
        let err = cli.exercise.apply(&mut AppConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidList { .. })));
    }

    #[test]
    fn test_config_subcommands() {
        assert!(matches!(
            parse(&["config", "show"]).command,
            Some(Commands::Config { action: ConfigAction::Show })
        ));
        assert!(matches!(
            parse(&["--config", "/tmp/b.toml", "config", "path"]).config,
            Some(ref p) if p == &PathBuf::from("/tmp/b.toml")
        ));
    }
}
