//! Output formatting for exercise plans and summaries.
//!
//! Supports table and JSON output for `plan`, and a short text summary.

use chrono::{DateTime, Local, TimeDelta};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::domain::{Clock, Exercise, PhaseType, RunSummary};

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Phase table.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

/// One scheduled phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub index: usize,
    pub kind: PhaseType,
    pub duration_secs: u64,
    /// Offset from the start of the exercise.
    pub starts_at_secs: u64,
}

/// The full phase sequence of an exercise that has not run yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub phases: Vec<PlanEntry>,
    pub total_secs: u64,
    pub hold_secs: u64,
    pub countdown_secs: u64,
}

impl Plan {
    #[must_use]
    pub fn from_exercise<C: Clock>(exercise: &Exercise<C>) -> Self {
        let mut offset = 0;
        let phases = exercise
            .phases()
            .iter()
            .enumerate()
            .map(|(index, phase)| {
                let entry = PlanEntry {
                    index,
                    kind: phase.kind(),
                    duration_secs: phase.duration(),
                    starts_at_secs: offset,
                };
                offset += phase.duration();
                entry
            })
            .collect();

        Self {
            phases,
            total_secs: exercise.total_seconds(),
            hold_secs: exercise.hold_seconds(),
            countdown_secs: exercise.config().countdown_threshold(),
        }
    }
}

/// Formats a plan as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_plan_json(plan: &Plan) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(plan)
}

/// Formats a plan as a table.
pub fn format_plan_table(plan: &Plan) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Phase", "Duration", "Starts at"]);

    for entry in &plan.phases {
        let duration = if entry.kind.is_terminal() {
            "-".to_string()
        } else {
            format!("{}s", entry.duration_secs)
        };

        table.add_row(vec![
            (entry.index + 1).to_string(),
            entry.kind.instruction().to_string(),
            duration,
            format_clock(entry.starts_at_secs),
        ]);
    }

    table.to_string()
}

/// Totals line for a plan, with the expected finish time if started at `now`.
pub fn format_plan_totals(plan: &Plan, now: DateTime<Local>) -> String {
    let total = i64::try_from(plan.total_secs).unwrap_or(0);
    let finish = now + TimeDelta::seconds(total);
    format!(
        "{} {}  Holds: {}  Countdown: {}s  Ends around {}",
        "Total:".bold(),
        format_clock(plan.total_secs).cyan(),
        format_clock(plan.hold_secs).yellow(),
        plan.countdown_secs,
        finish.format("%H:%M").to_string().green()
    )
}

/// Formats a run summary for logs and non-terminal output.
pub fn format_summary(summary: &RunSummary) -> String {
    let status = if summary.finished {
        "completed".green()
    } else {
        "interrupted".yellow()
    };
    format!(
        "Exercise {status}: {}/{} phases, {} holds, {} of {} held, {} elapsed",
        summary.phases_completed,
        summary.phases_total,
        summary.holds_completed,
        format_clock(summary.held_seconds),
        format_clock(summary.hold_seconds),
        format_clock(summary.elapsed_seconds)
    )
}

/// `MM:SS` text for a number of seconds.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
