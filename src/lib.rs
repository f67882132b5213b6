//! Focus Timer - A focus/break interval timer daemon
//!
//! This library provides the timer engine that owns the timer state, the
//! shared store it persists to, the wake-up scheduler, the session log and
//! the views rendered for the popup.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;
pub mod view;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
