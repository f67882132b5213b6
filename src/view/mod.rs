//! View module
//!
//! This module renders the persisted state for the popup: the timer, the
//! stats, the session log and the calendar.

pub mod calendar;
pub mod controller;
pub mod logs;
pub mod render;

// Re-export main types
pub use calendar::CalendarMonth;
pub use controller::{view_controller_task, CalendarDirection, PopupView, ViewController};
pub use logs::LogEntry;
pub use render::TimerView;
