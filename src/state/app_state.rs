//! Timer engine: the single owner of every timer transition

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{session, Phase, PhaseDurations, Session, Store, Tick, TimerState};
use crate::{
    clock::{local_date, Clock},
    error::{Error, Result},
    services::Alerts,
    tasks::alarms::{AlarmScheduler, COMPLETION_ALARM, TICK_ALARM, TICK_PERIOD},
};

/// Colour of the badge showing today's session count
pub const BADGE_COLOR: &str = "#dc2626";

/// Result of a user command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// False when the command was a no-op in the current state
    pub applied: bool,
    pub state: TimerState,
}

impl CommandOutcome {
    fn applied(state: TimerState) -> Self {
        Self { applied: true, state }
    }

    fn ignored(state: TimerState) -> Self {
        Self { applied: false, state }
    }
}

/// Today's session count as shown on the toolbar badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Session count, empty when there are none today
    pub text: String,
    pub color: String,
}

impl Badge {
    fn for_count(count: usize) -> Self {
        Self {
            text: if count > 0 { count.to_string() } else { String::new() },
            color: BADGE_COLOR.to_string(),
        }
    }
}

/// Authoritative timer engine.
///
/// All writes to the timer state go through the named transitions below and
/// are serialized by one lock. The store stays the source of truth: every
/// transition re-reads it before applying.
pub struct AppState {
    pub store: Arc<Store>,
    pub scheduler: AlarmScheduler,
    alerts: Arc<dyn Alerts>,
    clock: Arc<dyn Clock>,
    pub durations: PhaseDurations,
    transition_lock: Mutex<()>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last command and when it ran
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    badge_tx: watch::Sender<Badge>,
}

impl AppState {
    /// Create the engine over an already initialized store
    pub fn new(
        store: Arc<Store>,
        scheduler: AlarmScheduler,
        alerts: Arc<dyn Alerts>,
        clock: Arc<dyn Clock>,
        durations: PhaseDurations,
        host: String,
        port: u16,
    ) -> Self {
        let (badge_tx, _) = watch::channel(Badge::for_count(0));
        Self {
            store,
            scheduler,
            alerts,
            clock,
            durations,
            transition_lock: Mutex::new(()),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            badge_tx,
        }
    }

    /// Current time according to the engine's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Local calendar day according to the engine's clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// State used when the store holds none
    pub fn default_state(&self) -> TimerState {
        TimerState::idle(Phase::Focus, &self.durations)
    }

    /// Persisted timer state
    pub fn timer_state(&self) -> TimerState {
        self.store.timer_state_or(self.default_state())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.transition_lock
            .lock()
            .map_err(|_| Error::Lock("timer transitions"))
    }

    /// Start or resume the current phase
    pub fn start_timer(&self) -> Result<CommandOutcome> {
        let _guard = self.lock()?;
        let now = self.clock.now();
        let mut state = self.timer_state();

        let Some(end_time) = state.start(now) else {
            debug!("Start ignored: running={}, remaining={}", state.is_running, state.remaining_seconds);
            return Ok(CommandOutcome::ignored(state));
        };

        self.store.save_timer_state(&state)?;
        self.arm_alarms(end_time);
        self.record_action("start");
        info!("Started {} phase, {}s left", state.current_phase, state.remaining_seconds);
        Ok(CommandOutcome::applied(state))
    }

    /// Pause the running phase, keeping the time left
    pub fn pause_timer(&self) -> Result<CommandOutcome> {
        let _guard = self.lock()?;
        let now = self.clock.now();
        let mut state = self.timer_state();

        if !state.is_running() {
            debug!("Pause ignored: timer not running");
            return Ok(CommandOutcome::ignored(state));
        }

        self.record_action("pause");
        if state.remaining_at(now) == 0 {
            info!("Pause requested at the deadline, completing instead");
            let state = self.complete(state)?;
            return Ok(CommandOutcome::applied(state));
        }

        self.cancel_alarms();
        state.pause(now);
        self.store.save_timer_state(&state)?;
        info!("Paused {} phase with {}s left", state.current_phase, state.remaining_seconds);
        Ok(CommandOutcome::applied(state))
    }

    /// Stop and restore the full duration of the current phase
    pub fn reset_timer(&self) -> Result<CommandOutcome> {
        let _guard = self.lock()?;
        let mut state = self.timer_state();

        self.cancel_alarms();
        state.reset(&self.durations);
        self.store.save_timer_state(&state)?;
        self.record_action("reset");
        info!("Reset {} phase", state.current_phase);
        Ok(CommandOutcome::applied(state))
    }

    /// Switch to another phase; ignored while running
    pub fn switch_phase(&self, phase: Phase) -> Result<CommandOutcome> {
        let _guard = self.lock()?;
        let mut state = self.timer_state();

        if !state.switch_phase(phase, &self.durations) {
            debug!("Phase switch to {} ignored while running", phase);
            return Ok(CommandOutcome::ignored(state));
        }

        self.store.save_timer_state(&state)?;
        self.record_action(phase.as_str());
        info!("Switched to {} phase", phase);
        Ok(CommandOutcome::applied(state))
    }

    /// Handle a fired wake-up
    pub fn handle_alarm(&self, name: &str) -> Result<Tick> {
        let _guard = self.lock()?;
        let now = self.clock.now();
        let mut state = self.timer_state();

        let tick = state.tick(now);
        match tick {
            Tick::Stale => {
                debug!("Alarm {} fired but timer is not running, cancelling it", name);
                self.scheduler.cancel(name);
            }
            Tick::Due => {
                self.complete(state)?;
            }
            Tick::Running(remaining) => {
                // Readers derive the display from endTime; nothing to persist
                if name == COMPLETION_ALARM {
                    // Fired early, e.g. after a wall clock change
                    debug!("Completion alarm fired with {}s left, rescheduling", remaining);
                    self.scheduler
                        .schedule_once(COMPLETION_ALARM, Duration::from_secs(remaining));
                }
            }
        }
        Ok(tick)
    }

    /// Cancel wake-ups left behind after the timer stopped running
    pub fn drop_orphaned_alarms(&self) -> Result<()> {
        let _guard = self.lock()?;
        if !self.timer_state().is_running() {
            self.cancel_alarms();
        }
        Ok(())
    }

    /// Schedule the completion and tick wake-ups for a deadline
    pub fn arm_alarms(&self, end_time: DateTime<Utc>) {
        let delay = (end_time - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
        self.scheduler.schedule_once(COMPLETION_ALARM, delay);
        self.scheduler.schedule_repeating(TICK_ALARM, TICK_PERIOD);
    }

    fn cancel_alarms(&self) {
        self.scheduler.cancel(COMPLETION_ALARM);
        self.scheduler.cancel(TICK_ALARM);
    }

    fn complete(&self, mut state: TimerState) -> Result<TimerState> {
        self.cancel_alarms();
        let now = self.clock.now();
        let phase = state.complete(&self.durations);
        self.store.save_timer_state(&state)?;

        if phase == Phase::Focus {
            let session = Session::focus(now, local_date(now), self.durations.focus_seconds);
            self.store.append_session(session)?;
            self.update_badge();
        }

        let (title, message) = completion_message(phase);
        self.alerts.notify(title, message);
        self.alerts.play_cue();
        info!("{} phase complete", phase);
        Ok(state)
    }

    /// Wipe the session log; refused unless confirmed
    pub fn clear_sessions(&self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(Error::ConfirmationRequired);
        }
        self.store.clear_sessions()?;
        self.update_badge();
        self.record_action("clear-sessions");
        warn!("All sessions cleared");
        Ok(())
    }

    /// Full session log
    pub fn sessions(&self) -> Vec<Session> {
        self.store.sessions()
    }

    /// Recompute the badge from today's sessions
    pub fn update_badge(&self) -> Badge {
        let today = self.today();
        let count = session::today_stats(&self.store.sessions(), today).count;
        let badge = Badge::for_count(count);
        self.badge_tx.send_replace(badge.clone());
        debug!("Badge updated: {:?}", badge.text);
        badge
    }

    /// Current badge
    pub fn badge(&self) -> Badge {
        self.badge_tx.borrow().clone()
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), self.clock.now()));
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

fn completion_message(phase: Phase) -> (&'static str, &'static str) {
    match phase {
        Phase::Focus => ("Focus session complete", "Great work! Time for a break."),
        Phase::Break => ("Break is over", "Ready to focus again?"),
    }
}
