//! Breathwork - breath-hold training timer for the terminal.
//!
//! Runs a sequence of phases (optional preparation, then a fixed breathing
//! phase before each breath hold) with large countdown digits and audio cues.
//!
//! QUICK START:
//!   breathwork                        # Default exercise: holds of 30, 60, 90s
//!   breathwork -b 20 -H 45,60,75      # Custom breathing and holds
//!   breathwork --plain -a off         # Single line, no sound
//!   breathwork plan --format json     # Phase sequence without running it
//!   breathwork config init            # Write ~/.breathwork/config.toml

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_plan_json, format_plan_table, format_plan_totals, run_exercise, OutputFormat, Plan,
    RunOptions, RunOutcome,
};
use cli::{Cli, Commands, ConfigAction};
use domain::{AppConfig, AppError, Exercise};
use infrastructure::{
    config_file_path, config_to_toml, ensure_config_exists, load_config, AudioOutput,
    RuntimeClock, TerminalDisplay,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        if let AppError::State(state) = &e {
            tracing::error!(error = %state, "Exercise state machine violated");
        }
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: &Cli) -> domain::Result<()> {
    match &cli.command {
        None | Some(Commands::Run) => cmd_run(&resolve_config(cli)?),
        Some(Commands::Plan { format }) => {
            let format = format
                .parse::<OutputFormat>()
                .map_err(|message| AppError::InvalidArgument { message })?;
            cmd_plan(&resolve_config(cli)?, format)
        }
        Some(Commands::Config { action }) => cmd_config(cli, *action),
    }
}

/// Configuration file plus command-line overrides.
fn resolve_config(cli: &Cli) -> domain::Result<AppConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.exercise.apply(&mut config)?;
    Ok(config)
}

fn cmd_run(config: &AppConfig) -> domain::Result<()> {
    // Validate everything before touching the terminal
    let exercise_config = config.exercise_config()?;
    let options = RunOptions {
        poll_interval: config.timing.poll_interval()?,
    };

    let mut exercise = Exercise::new(exercise_config, &RuntimeClock);
    let mut display =
        TerminalDisplay::stdout(exercise.config().display_mode(), config.display.sidebar);
    let mut audio = AudioOutput::for_mode(config.audio.mode);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::io("Failed to start async runtime", e))?;

    let outcome = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => on_signal.cancel(),
                Err(e) => tracing::warn!(error = %e, "Cannot listen for Ctrl-C"),
            }
        });

        run_exercise(&mut exercise, &mut display, &mut audio, &options, &cancel).await
    })?;

    let summary = outcome.summary();
    tracing::debug!(
        interrupted = matches!(outcome, RunOutcome::Interrupted(_)),
        phases_completed = summary.phases_completed,
        elapsed_secs = summary.elapsed_seconds,
        "Run finished"
    );

    Ok(())
}

fn cmd_plan(config: &AppConfig, format: OutputFormat) -> domain::Result<()> {
    let exercise = Exercise::new(config.exercise_config()?, &RuntimeClock);
    let plan = Plan::from_exercise(&exercise);

    match format {
        OutputFormat::Table => {
            println!("{}", format_plan_table(&plan));
            println!();
            println!("{}", format_plan_totals(&plan, chrono::Local::now()));
        }
        OutputFormat::Json => {
            println!("{}", format_plan_json(&plan).map_err(AppError::json)?);
        }
    }

    Ok(())
}

fn cmd_config(cli: &Cli, action: ConfigAction) -> domain::Result<()> {
    let path = config_file_path(cli.config.as_deref());

    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Init => {
            if ensure_config_exists(&path)? {
                println!("{} Created {}", "✓".green().bold(), path.display());
            } else {
                println!("{} {} already exists", "•".yellow(), path.display());
            }
        }
        ConfigAction::Show => {
            let config = resolve_config(cli)?;
            print!("{}", config_to_toml(&config)?);
        }
    }

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout belongs to the display
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
