//! External service module
//!
//! This module contains the collaborators the engine hands off to: desktop
//! notifications and the audio cue.

pub mod alerts;

// Re-export main types
pub use alerts::{check_notifier_available, Alerts, DesktopAlerts};
