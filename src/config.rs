//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{services::alerts::DEFAULT_SOUND_FILE, state::PhaseDurations};

/// Longest accepted phase, in minutes
pub const MAX_PHASE_MINUTES: u64 = 24 * 60;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A focus/break interval timer daemon with session logging")]
#[command(version)]
pub struct Config {
    /// Port to bind the control API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Path of the shared state store
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Focus phase duration in minutes, up to a day
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..=MAX_PHASE_MINUTES))]
    pub focus_minutes: u64,

    /// Break phase duration in minutes, up to a day
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=MAX_PHASE_MINUTES))]
    pub break_minutes: u64,

    /// Name stored on first run
    #[arg(long, default_value = "krit")]
    pub user_name: String,

    /// Sound played when a phase completes
    #[arg(long, default_value = DEFAULT_SOUND_FILE)]
    pub sound_file: PathBuf,

    /// Do not play the completion sound
    #[arg(long)]
    pub no_sound: bool,

    /// Do not show desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Phase durations in seconds
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations::from_minutes(self.focus_minutes, self.break_minutes)
    }

    /// Store path, defaulting to the user's data directory
    pub fn store_path(&self) -> PathBuf {
        self.store.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("focus-timer")
                .join("store.json")
        })
    }
}
