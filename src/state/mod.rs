//! State management module
//!
//! This module contains the timer state machine, the session log, the shared
//! store and the engine that owns all transitions.

pub mod app_state;
pub mod session;
pub mod store;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, CommandOutcome};
pub use session::{Session, Stats};
pub use store::{Store, StoreChange};
pub use timer_state::{Phase, PhaseDurations, Tick, TimerState};
