//! Timer display derived from the persisted state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Phase, PhaseDurations, TimerState};

/// Everything the popup shows for the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    /// Remaining time as `MM:SS`
    pub display: String,
    pub phase: Phase,
    pub phase_label: String,
    /// Elapsed share of the phase, 0 to 100
    pub progress: f64,
    pub show_start: bool,
    pub show_pause: bool,
    /// Phase buttons are disabled during a run
    pub phase_switch_enabled: bool,
}

impl TimerView {
    /// Render `state` as of `now`
    pub fn render(state: &TimerState, durations: &PhaseDurations, now: DateTime<Utc>) -> Self {
        let remaining = state.remaining_at(now);
        let running = state.is_running();
        Self {
            display: format_clock(remaining),
            phase: state.current_phase,
            phase_label: state.current_phase.label().to_string(),
            progress: progress(remaining, durations.full(state.current_phase)),
            show_start: !running,
            show_pause: running,
            phase_switch_enabled: !running,
        }
    }
}

/// Format seconds as `MM:SS`; minutes are not wrapped into hours
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn progress(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let elapsed = total.saturating_sub(remaining);
    (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}
