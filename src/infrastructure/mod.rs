//! Infrastructure layer - external adapters (terminal, audio, filesystem, clock).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod ascii_art;
pub mod audio;
pub mod clock;
pub mod config;
pub mod terminal;

pub use audio::AudioOutput;
pub use clock::RuntimeClock;
pub use config::{config_file_path, config_to_toml, ensure_config_exists, load_config};
pub use terminal::TerminalDisplay;
