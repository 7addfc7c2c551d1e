//! Terminal rendering of exercise progress.
//!
//! TUI mode takes over the screen: a rounded box with the remaining time in
//! large digits and a sidebar listing every phase. Plain mode rewrites a
//! single line and is safe for pipes.

use std::io::{self, Stdout, Write};

use colored::{Color, Colorize};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    terminal::{Clear, ClearType},
};

use crate::application::{format_clock, format_summary, Display};
use crate::domain::{
    DisplayMode, ExerciseSnapshot, PhaseOutline, PhaseState, PhaseType, RunSummary,
};

use super::ascii_art;

const BOX_WIDTH: usize = 40;
const PADDING_TOP: usize = 3;
const PADDING_BOTTOM: usize = 3;
const SIDEBAR_WIDTH: usize = 25;
const SIDEBAR_GAP: usize = 2;

const COMPLETION_TITLE: &str = "Congratulations";
const COMPLETION_MESSAGE: &str = "Exercise Complete! Great job!";
const INTERRUPTION_MESSAGE: &str = "Exercise interrupted by user";

/// Renders to a terminal (or any writer, for tests).
pub struct TerminalDisplay<W: Write> {
    out: W,
    mode: DisplayMode,
    sidebar: bool,
    /// Screen is taken over and the cursor hidden.
    live: bool,
    last_frame: String,
}

impl TerminalDisplay<Stdout> {
    #[must_use]
    pub fn stdout(mode: DisplayMode, sidebar: bool) -> Self {
        Self::new(io::stdout(), mode, sidebar)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub const fn new(out: W, mode: DisplayMode, sidebar: bool) -> Self {
        Self {
            out,
            mode,
            sidebar,
            live: false,
            last_frame: String::new(),
        }
    }

    fn release(&mut self) -> io::Result<()> {
        if self.live {
            queue!(self.out, Show)?;
            self.live = false;
        }
        Ok(())
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn begin(&mut self, _snapshot: &ExerciseSnapshot) -> io::Result<()> {
        if self.mode == DisplayMode::Tui {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0), Hide)?;
            self.live = true;
        }
        self.out.flush()
    }

    fn render(&mut self, snapshot: &ExerciseSnapshot) -> io::Result<()> {
        match self.mode {
            DisplayMode::Tui => {
                let frame = build_frame(snapshot, self.sidebar);
                if frame == self.last_frame {
                    return Ok(());
                }
                queue!(self.out, MoveTo(0, 0))?;
                self.out.write_all(frame.as_bytes())?;
                queue!(self.out, Clear(ClearType::FromCursorDown))?;
                self.last_frame = frame;
            }
            DisplayMode::Plain => {
                write!(
                    self.out,
                    "\r{}: {}    ",
                    snapshot.kind.instruction(),
                    format_clock(snapshot.remaining)
                )?;
            }
        }
        self.out.flush()
    }

    fn transition(&mut self, from: &PhaseOutline, to: &PhaseOutline) -> io::Result<()> {
        // Redrawing the box is enough in TUI mode
        if self.mode == DisplayMode::Plain && !to.kind.is_terminal() {
            writeln!(self.out)?;
            writeln!(self.out, "Transitioning from {} to {}", from.kind, to.kind)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        match self.mode {
            DisplayMode::Tui => {
                queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
                self.release()?;
                for line in completion_panel() {
                    writeln!(self.out, "{line}")?;
                }
            }
            DisplayMode::Plain => {
                writeln!(self.out)?;
                writeln!(self.out)?;
                writeln!(self.out, "{COMPLETION_MESSAGE}")?;
            }
        }
        writeln!(self.out, "{}", format_summary(summary))?;
        self.out.flush()
    }

    fn interrupted(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.release()?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", INTERRUPTION_MESSAGE.yellow().bold())?;
        writeln!(self.out, "{}", format_summary(summary))?;
        self.out.flush()
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        // Never leave the cursor hidden, whatever happened to the run
        let _ = self.release();
        let _ = self.out.flush();
    }
}

const fn phase_color(kind: PhaseType) -> Color {
    match kind {
        PhaseType::Preparation => Color::Blue,
        PhaseType::Breathe => Color::Cyan,
        PhaseType::Hold => Color::Yellow,
        PhaseType::Complete => Color::Green,
    }
}

/// Full TUI frame: timer box plus optional sidebar, newline separated.
fn build_frame(snapshot: &ExerciseSnapshot, sidebar: bool) -> String {
    let main = timer_box(snapshot);
    if !sidebar {
        return main.join("\n");
    }

    let side = sidebar_lines(snapshot);
    let rows = main.len().max(side.len());
    let blank = " ".repeat(BOX_WIDTH);
    let gap = " ".repeat(SIDEBAR_GAP);

    (0..rows)
        .map(|i| {
            let left = main.get(i).map_or(blank.as_str(), String::as_str);
            let right = side.get(i).map_or("", String::as_str);
            format!("{left}{gap}{right}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn timer_box(snapshot: &ExerciseSnapshot) -> Vec<String> {
    let color = phase_color(snapshot.kind);
    let inner = BOX_WIDTH - 2;
    let side = "│".color(color).to_string();
    let empty_row = format!("{side}{}{side}", " ".repeat(inner));

    let mut lines = Vec::with_capacity(PADDING_TOP + PADDING_BOTTOM + ascii_art::GLYPH_HEIGHT + 2);
    lines.push(top_border(&snapshot.kind.instruction().to_uppercase(), color));
    lines.extend(std::iter::repeat_n(empty_row.clone(), PADDING_TOP));

    for row in ascii_art::clock_face(snapshot.remaining) {
        let width = row.chars().count().min(inner);
        let left = (inner - width) / 2;
        let right = inner - width - left;
        let digits = if snapshot.state == PhaseState::Countdown {
            row.red().bold()
        } else {
            row.color(color).bold()
        };
        lines.push(format!(
            "{side}{}{digits}{}{side}",
            " ".repeat(left),
            " ".repeat(right)
        ));
    }

    lines.extend(std::iter::repeat_n(empty_row, PADDING_BOTTOM));
    lines.push(format!("╰{}╯", "─".repeat(inner)).color(color).to_string());
    lines
}

fn top_border(title: &str, color: Color) -> String {
    let title = format!(" {title} ");
    let title_width = title.chars().count();
    let left = (BOX_WIDTH.saturating_sub(title_width + 2)) / 2;
    let right = BOX_WIDTH.saturating_sub(title_width + 2 + left);
    format!("╭{}{title}{}╮", "─".repeat(left), "─".repeat(right))
        .color(color)
        .to_string()
}

fn sidebar_lines(snapshot: &ExerciseSnapshot) -> Vec<String> {
    let mut lines: Vec<String> = snapshot
        .phases
        .iter()
        .enumerate()
        .map(|(i, phase)| {
            let label = truncate(&phase.label(), SIDEBAR_WIDTH - 3);
            let done = i < snapshot.index || phase.state == PhaseState::Completed;
            if done {
                format!("✓ {label}").dimmed().to_string()
            } else if i == snapshot.index {
                format!("▶ {label}")
                    .color(phase_color(phase.kind))
                    .bold()
                    .to_string()
            } else {
                format!("  {label}").color(phase_color(phase.kind)).to_string()
            }
        })
        .collect();

    lines.push(String::new());
    lines.push(format!("{}% done", snapshot.progress_percent()).dimmed().to_string());
    lines
}

fn completion_panel() -> Vec<String> {
    let inner = BOX_WIDTH - 2;
    let width = COMPLETION_MESSAGE.chars().count();
    let left = (inner - width) / 2;
    let right = inner - width - left;
    let side = "│".green().to_string();

    vec![
        top_border(COMPLETION_TITLE, Color::Green),
        format!("{side}{}{side}", " ".repeat(inner)),
        format!(
            "{side}{}{}{}{side}",
            " ".repeat(left),
            COMPLETION_MESSAGE.green().bold(),
            " ".repeat(right)
        ),
        format!("{side}{}{side}", " ".repeat(inner)),
        format!("╰{}╯", "─".repeat(inner)).green().to_string(),
    ]
}

/// Truncates a string to max characters with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
