//! Background tasks module
//!
//! This module contains the wake-up scheduler and the tasks that run
//! alongside the HTTP server.

pub mod alarms;
pub mod recovery;
pub mod timer_engine;

// Re-export main functions
pub use alarms::AlarmScheduler;
pub use recovery::resume_persisted_timer;
pub use timer_engine::timer_engine_task;
