//! Timer state structure and its transitions

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Timer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    /// Name used in the store and in URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::Break => "break",
        }
    }

    /// Label shown above the clock
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus Session",
            Phase::Break => "Break Time",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(Phase::Focus),
            "break" => Ok(Phase::Break),
            other => Err(Error::InvalidPhase(other.to_string())),
        }
    }
}

/// Fixed full duration of each phase, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDurations {
    pub focus_seconds: u64,
    pub break_seconds: u64,
}

impl PhaseDurations {
    pub fn new(focus_seconds: u64, break_seconds: u64) -> Self {
        Self { focus_seconds, break_seconds }
    }

    /// Build from whole minutes
    pub fn from_minutes(focus_minutes: u64, break_minutes: u64) -> Self {
        Self::new(focus_minutes.saturating_mul(60), break_minutes.saturating_mul(60))
    }

    /// Full duration of a phase
    pub fn full(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_seconds,
            Phase::Break => self.break_seconds,
        }
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::from_minutes(50, 10)
    }
}

/// Result of a tick against the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Still running with this many seconds left
    Running(u64),
    /// Deadline reached, the phase must complete
    Due,
    /// Timer is not running; the wake-up is orphaned
    Stale,
}

/// Persisted timer state.
///
/// `end_time` is set exactly when `is_running` is true. While running the
/// remaining time is derived from `end_time`, never decremented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    pub remaining_seconds: u64,
    pub current_phase: Phase,
    #[serde(with = "chrono::serde::ts_milliseconds_option", default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl TimerState {
    /// Create an idle timer holding the full duration of `phase`
    pub fn idle(phase: Phase, durations: &PhaseDurations) -> Self {
        Self {
            is_running: false,
            remaining_seconds: durations.full(phase),
            current_phase: phase,
            end_time: None,
        }
    }

    /// Check if the timer is running
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Repair a value that breaks the running/end_time invariant
    pub fn normalized(mut self) -> Self {
        if self.is_running != self.end_time.is_some() {
            self.is_running = false;
            self.end_time = None;
        }
        self
    }

    /// Seconds left at `now`, rounded up so the clock never shows 00:00 early
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match (self.is_running, self.end_time) {
            (true, Some(end_time)) => {
                let millis = (end_time - now).num_milliseconds().max(0) as u64;
                millis.div_ceil(1000)
            }
            _ => self.remaining_seconds,
        }
    }

    /// Switch phase; ignored while running. Returns whether anything changed.
    pub fn switch_phase(&mut self, phase: Phase, durations: &PhaseDurations) -> bool {
        if self.is_running {
            return false;
        }
        *self = Self::idle(phase, durations);
        true
    }

    /// Start counting down. Returns the deadline when the timer was started;
    /// a deadline past what a timestamp can hold is refused.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_running || self.remaining_seconds == 0 {
            return None;
        }
        let remaining = i64::try_from(self.remaining_seconds).ok()?;
        let end_time = now.checked_add_signed(Duration::try_seconds(remaining)?)?;
        self.is_running = true;
        self.end_time = Some(end_time);
        Some(end_time)
    }

    /// Stop counting down, keeping what is left. Returns whether it was running.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_running {
            return false;
        }
        self.remaining_seconds = self.remaining_at(now);
        self.is_running = false;
        self.end_time = None;
        true
    }

    /// Back to the full duration of the current phase, idle
    pub fn reset(&mut self, durations: &PhaseDurations) {
        *self = Self::idle(self.current_phase, durations);
    }

    /// Refresh the displayed remaining time from the deadline
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        if !self.is_running {
            return Tick::Stale;
        }
        match self.remaining_at(now) {
            0 => Tick::Due,
            remaining => {
                self.remaining_seconds = remaining;
                Tick::Running(remaining)
            }
        }
    }

    /// Finish the current phase. The phase is kept; only an explicit switch changes it.
    pub fn complete(&mut self, durations: &PhaseDurations) -> Phase {
        let phase = self.current_phase;
        *self = Self::idle(phase, durations);
        phase
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::idle(Phase::Focus, &PhaseDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn secs(n: i64) -> Duration {
        Duration::seconds(n)
    }

    #[test]
    fn test_default_is_idle_focus() {
        let state = TimerState::default();
        assert!(!state.is_running());
        assert_eq!(state.current_phase, Phase::Focus);
        assert_eq!(state.remaining_seconds, 3000);
        assert_eq!(state.end_time, None);
    }

    #[test]
    fn test_remaining_is_derived_from_deadline() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Focus, &durations);
        let end = state.start(t0()).unwrap();
        assert_eq!(end, t0() + secs(3000));

        assert_eq!(state.remaining_at(t0()), 3000);
        assert_eq!(state.remaining_at(t0() + secs(1)), 2999);
        assert_eq!(state.remaining_at(t0() + Duration::milliseconds(1500)), 2999);
        assert_eq!(state.remaining_at(t0() + secs(2999)), 1);
        assert_eq!(state.remaining_at(t0() + secs(3000)), 0);
        assert_eq!(state.remaining_at(t0() + secs(9000)), 0);
    }

    #[test]
    fn test_pause_then_start_keeps_remainder() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Focus, &durations);
        state.start(t0());

        assert!(state.pause(t0() + secs(10)));
        assert!(!state.is_running());
        assert_eq!(state.remaining_seconds, 2990);
        assert_eq!(state.end_time, None);

        let end = state.start(t0() + secs(100)).unwrap();
        assert_eq!(end, t0() + secs(100) + secs(2990));
    }

    #[test]
    fn test_start_and_pause_are_noops_in_wrong_state() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Focus, &durations);
        assert!(!state.pause(t0()));
        assert_eq!(state, TimerState::idle(Phase::Focus, &durations));

        state.start(t0());
        let before = state.clone();
        assert_eq!(state.start(t0() + secs(5)), None);
        assert_eq!(state, before);
    }

    #[test]
    fn test_start_with_nothing_left_is_rejected() {
        let mut state = TimerState {
            is_running: false,
            remaining_seconds: 0,
            current_phase: Phase::Break,
            end_time: None,
        };
        assert_eq!(state.start(t0()), None);
        assert!(!state.is_running());
    }

    #[test]
    fn test_start_with_unrepresentable_deadline_is_rejected() {
        for remaining_seconds in [100_000_000_000_000, u64::MAX] {
            let mut state = TimerState {
                is_running: false,
                remaining_seconds,
                current_phase: Phase::Focus,
                end_time: None,
            };
            let before = state.clone();
            assert_eq!(state.start(t0()), None);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_from_minutes_saturates() {
        let durations = PhaseDurations::from_minutes(u64::MAX, 10);
        assert_eq!(durations.focus_seconds, u64::MAX);
        assert_eq!(durations.break_seconds, 600);
    }

    #[test]
    fn test_reset_from_any_state() {
        let durations = PhaseDurations::default();
        let mut running = TimerState::idle(Phase::Break, &durations);
        running.start(t0());
        running.reset(&durations);
        assert_eq!(running, TimerState::idle(Phase::Break, &durations));

        let mut paused = TimerState::idle(Phase::Focus, &durations);
        paused.start(t0());
        paused.pause(t0() + secs(42));
        paused.reset(&durations);
        assert_eq!(paused.remaining_seconds, 3000);

        paused.reset(&durations);
        assert_eq!(paused, TimerState::idle(Phase::Focus, &durations));
    }

    #[test]
    fn test_switch_phase_ignored_while_running() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Focus, &durations);
        assert!(state.switch_phase(Phase::Break, &durations));
        assert_eq!(state.current_phase, Phase::Break);
        assert_eq!(state.remaining_seconds, 600);

        state.start(t0());
        let before = state.clone();
        assert!(!state.switch_phase(Phase::Focus, &durations));
        assert_eq!(state, before);
    }

    #[test]
    fn test_tick_updates_display_only() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Focus, &durations);
        let end = state.start(t0()).unwrap();

        assert_eq!(state.tick(t0() + secs(60)), Tick::Running(2940));
        assert_eq!(state.remaining_seconds, 2940);
        assert_eq!(state.end_time, Some(end));

        assert_eq!(state.tick(t0() + secs(3000)), Tick::Due);

        state.pause(t0() + secs(3000));
        assert_eq!(state.tick(t0() + secs(3001)), Tick::Stale);
    }

    #[test]
    fn test_complete_keeps_phase() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Break, &durations);
        state.start(t0());
        assert_eq!(state.complete(&durations), Phase::Break);
        assert_eq!(state, TimerState::idle(Phase::Break, &durations));
    }

    #[test]
    fn test_normalized_repairs_invariant() {
        let broken = TimerState {
            is_running: true,
            remaining_seconds: 120,
            current_phase: Phase::Focus,
            end_time: None,
        };
        let fixed = broken.normalized();
        assert!(!fixed.is_running());
        assert_eq!(fixed.remaining_seconds, 120);
    }

    #[test]
    fn test_json_layout() {
        let durations = PhaseDurations::default();
        let mut state = TimerState::idle(Phase::Focus, &durations);
        let idle = serde_json::to_value(&state).unwrap();
        assert_eq!(
            idle,
            serde_json::json!({
                "isRunning": false,
                "remainingSeconds": 3000,
                "currentPhase": "focus",
                "endTime": null,
            })
        );

        state.start(t0());
        let running = serde_json::to_value(&state).unwrap();
        assert_eq!(running["endTime"], serde_json::json!(t0().timestamp_millis() + 3_000_000));
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!("focus".parse::<Phase>().unwrap(), Phase::Focus);
        assert_eq!("break".parse::<Phase>().unwrap(), Phase::Break);
        assert!("nap".parse::<Phase>().is_err());
    }
}
