//! Restart recovery for a timer that was running when the process stopped

use tracing::info;

use crate::{
    error::Result,
    state::{AppState, Tick},
    tasks::alarms::COMPLETION_ALARM,
};

/// Resume a persisted running timer.
///
/// A deadline that passed while the process was down completes the phase
/// right away; otherwise both wake-ups are re-armed against the stored
/// deadline.
pub fn resume_persisted_timer(state: &AppState) -> Result<()> {
    let timer = state.timer_state();
    let Some(end_time) = timer.end_time.filter(|_| timer.is_running()) else {
        info!("No running timer to resume");
        return Ok(());
    };

    match state.handle_alarm(COMPLETION_ALARM)? {
        Tick::Due => {
            info!("{} phase ended while stopped, completed on startup", timer.current_phase);
        }
        Tick::Running(remaining) => {
            state.arm_alarms(end_time);
            info!("Resumed {} phase with {}s left", timer.current_phase, remaining);
        }
        Tick::Stale => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        clock::{testing::ManualClock, Clock},
        services::alerts::testing::RecordingAlerts,
        state::{Phase, PhaseDurations, Store, TimerState},
        tasks::alarms::{AlarmScheduler, TICK_ALARM},
    };

    fn restarted(
        persisted: &TimerState,
        clock: Arc<ManualClock>,
    ) -> (AppState, mpsc::UnboundedReceiver<String>) {
        let store = Arc::new(Store::in_memory());
        store.save_timer_state(persisted).unwrap();
        let (scheduler, fired) = AlarmScheduler::new();
        let state = AppState::new(
            store,
            scheduler,
            Arc::new(RecordingAlerts::default()),
            clock,
            PhaseDurations::default(),
            "127.0.0.1".to_string(),
            0,
        );
        (state, fired)
    }

    fn running_since(clock: &ManualClock) -> TimerState {
        let mut timer = TimerState::idle(Phase::Focus, &PhaseDurations::default());
        timer.start(clock.now());
        timer
    }

    #[tokio::test]
    async fn test_resumes_pending_deadline() {
        let clock = Arc::new(ManualClock::epoch());
        let persisted = running_since(&clock);
        clock.advance(Duration::seconds(600));

        let (state, _fired) = restarted(&persisted, clock);
        resume_persisted_timer(&state).unwrap();

        let timer = state.timer_state();
        assert!(timer.is_running());
        assert_eq!(timer.end_time, persisted.end_time);
        assert_eq!(timer.remaining_at(state.now()), 2400);
        assert!(state.scheduler.is_scheduled(COMPLETION_ALARM));
        assert!(state.scheduler.is_scheduled(TICK_ALARM));
    }

    #[tokio::test]
    async fn test_completes_missed_deadline() {
        let clock = Arc::new(ManualClock::epoch());
        let persisted = running_since(&clock);
        clock.advance(Duration::hours(2));

        let (state, _fired) = restarted(&persisted, clock);
        resume_persisted_timer(&state).unwrap();

        assert_eq!(state.timer_state(), state.default_state());
        assert_eq!(state.sessions().len(), 1);
        assert!(!state.scheduler.is_scheduled(TICK_ALARM));
    }

    #[tokio::test]
    async fn test_idle_timer_is_left_alone() {
        let clock = Arc::new(ManualClock::epoch());
        let idle = TimerState::idle(Phase::Break, &PhaseDurations::default());

        let (state, _fired) = restarted(&idle, clock);
        resume_persisted_timer(&state).unwrap();

        assert_eq!(state.timer_state(), idle);
        assert!(!state.scheduler.is_scheduled(COMPLETION_ALARM));
    }
}
