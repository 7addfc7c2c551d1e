//! Audio cue backends.

use std::io::{self, Stdout, Write};
use std::process::{Child, Command, Stdio};

use crate::application::{Audio, AudioCue};
use crate::domain::AudioMode;

const BELL: &[u8] = b"\x07";

/// Rings the terminal bell: once per countdown second, twice per transition.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Audio for TerminalBell<W> {
    fn cue(&mut self, cue: AudioCue) -> io::Result<()> {
        let rings = match cue {
            AudioCue::CountdownBeep => 1,
            AudioCue::PhaseTransition => 2,
        };
        for _ in 0..rings {
            self.out.write_all(BELL)?;
            self.out.flush()?;
        }
        Ok(())
    }
}

/// Plays platform sounds through an external player without blocking.
///
/// Uses `afplay` on macOS and `paplay` on Linux. When no player exists for
/// the platform, or it cannot be spawned, the terminal bell is used instead.
pub struct SystemSound {
    players: Vec<Child>,
    fallback: TerminalBell<Stdout>,
}

impl SystemSound {
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            fallback: TerminalBell::stdout(),
        }
    }

    /// Drop handles of players that already exited.
    fn reap(&mut self) {
        self.players
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl Default for SystemSound {
    fn default() -> Self {
        Self::new()
    }
}

impl Audio for SystemSound {
    fn cue(&mut self, cue: AudioCue) -> io::Result<()> {
        self.reap();

        let Some(mut command) = sound_command(cue) else {
            return self.fallback.cue(cue);
        };

        match command.spawn() {
            Ok(child) => {
                self.players.push(child);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Sound player unavailable, using terminal bell");
                self.fallback.cue(cue)
            }
        }
    }
}

impl Drop for SystemSound {
    fn drop(&mut self) {
        for child in &mut self.players {
            let _ = child.wait();
        }
    }
}

fn sound_file(cue: AudioCue) -> Option<(&'static str, &'static str)> {
    if cfg!(target_os = "macos") {
        let file = match cue {
            AudioCue::CountdownBeep => "/System/Library/Sounds/Ping.aiff",
            AudioCue::PhaseTransition => "/System/Library/Sounds/Glass.aiff",
        };
        Some(("afplay", file))
    } else if cfg!(target_os = "linux") {
        let file = match cue {
            AudioCue::CountdownBeep => "/usr/share/sounds/freedesktop/stereo/message.oga",
            AudioCue::PhaseTransition => "/usr/share/sounds/freedesktop/stereo/complete.oga",
        };
        Some(("paplay", file))
    } else {
        None
    }
}

fn sound_command(cue: AudioCue) -> Option<Command> {
    let (program, file) = sound_file(cue)?;
    let mut command = Command::new(program);
    command
        .arg(file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(command)
}

/// Audio backend selected from configuration.
pub enum AudioOutput {
    Bell(TerminalBell<Stdout>),
    System(SystemSound),
    Silent,
}

impl AudioOutput {
    #[must_use]
    pub fn for_mode(mode: AudioMode) -> Self {
        match mode {
            AudioMode::Beep => Self::Bell(TerminalBell::stdout()),
            AudioMode::System => Self::System(SystemSound::new()),
            AudioMode::Off => Self::Silent,
        }
    }
}

impl Audio for AudioOutput {
    fn cue(&mut self, cue: AudioCue) -> io::Result<()> {
        match self {
            Self::Bell(bell) => bell.cue(cue),
            Self::System(sound) => sound.cue(cue),
            Self::Silent => Ok(()),
        }
    }
}
