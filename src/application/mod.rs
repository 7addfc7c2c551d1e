//! Application layer - use cases and orchestration.
//!
//! This layer drives an exercise through time and formats plans and
//! summaries for output.

pub mod formatter;
pub mod runner;

pub use formatter::{
    format_clock, format_plan_json, format_plan_table, format_plan_totals, format_summary,
    OutputFormat, Plan,
};
pub use runner::{run_exercise, Audio, AudioCue, Display, RunOptions, RunOutcome};
