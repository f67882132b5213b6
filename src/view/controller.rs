//! View controller: the foreground half that polls the shared store

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::{
    calendar::{shift_month, CalendarMonth},
    logs::{log_entries, LogEntry},
    render::TimerView,
};
use crate::{
    clock::Clock,
    error::{Error, Result},
    state::{session, Phase, PhaseDurations, Session, Stats, Store, TimerState},
};

/// How often the view re-reads the store without a change notification
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Session count and formatted time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsView {
    pub sessions: usize,
    pub time: String,
}

impl From<Stats> for StatsView {
    fn from(stats: Stats) -> Self {
        Self {
            sessions: stats.count,
            time: stats.formatted_time(),
        }
    }
}

/// Everything the popup shows outside the log tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupView {
    pub user_name: Option<String>,
    pub timer: TimerView,
    pub today: StatsView,
    pub total: StatsView,
}

/// Calendar navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarDirection {
    Prev,
    Next,
}

impl CalendarDirection {
    fn delta(self) -> i32 {
        match self {
            CalendarDirection::Prev => -1,
            CalendarDirection::Next => 1,
        }
    }
}

impl FromStr for CalendarDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prev" => Ok(CalendarDirection::Prev),
            "next" => Ok(CalendarDirection::Next),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// Read-side view of the store.
///
/// Holds no timer state of its own; every render is derived from what the
/// store holds at that moment. The calendar month cursor is the only local
/// state.
pub struct ViewController {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    durations: PhaseDurations,
    month: Mutex<(i32, u32)>,
    view_tx: watch::Sender<PopupView>,
}

impl ViewController {
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, durations: PhaseDurations) -> Self {
        let today = clock.today();
        let initial = render_popup(&store, clock.as_ref(), &durations);
        let (view_tx, _) = watch::channel(initial);
        Self {
            store,
            clock,
            durations,
            month: Mutex::new((today.year(), today.month())),
            view_tx,
        }
    }

    /// Re-read the store and publish a fresh view
    pub fn refresh(&self) -> PopupView {
        let view = render_popup(&self.store, self.clock.as_ref(), &self.durations);
        self.view_tx.send_replace(view.clone());
        view
    }

    /// Latest published view
    pub fn current(&self) -> PopupView {
        self.view_tx.borrow().clone()
    }

    /// Watch published views
    pub fn subscribe(&self) -> watch::Receiver<PopupView> {
        self.view_tx.subscribe()
    }

    /// Per-day log, newest first
    pub fn logs(&self) -> Vec<LogEntry> {
        log_entries(&self.store.sessions(), self.clock.today())
    }

    /// Calendar at the month cursor
    pub fn calendar(&self) -> Result<CalendarMonth> {
        let (year, month) = *self.month.lock().map_err(|_| Error::Lock("calendar month"))?;
        self.calendar_for(year, month)
    }

    /// Calendar for an explicit month
    pub fn calendar_for(&self, year: i32, month: u32) -> Result<CalendarMonth> {
        let counts = session::day_counts(&self.store.sessions());
        CalendarMonth::build(year, month, &counts, self.clock.today())
            .ok_or(Error::InvalidMonth { year, month })
    }

    /// Move the month cursor and return the new calendar
    pub fn change_month(&self, direction: CalendarDirection) -> Result<CalendarMonth> {
        let (year, month) = {
            let mut cursor = self.month.lock().map_err(|_| Error::Lock("calendar month"))?;
            *cursor = shift_month(cursor.0, cursor.1, direction.delta());
            *cursor
        };
        debug!("Calendar moved to {}-{:02}", year, month);
        self.calendar_for(year, month)
    }
}

fn render_popup(store: &Store, clock: &dyn Clock, durations: &PhaseDurations) -> PopupView {
    let state = store.timer_state_or(TimerState::idle(Phase::Focus, durations));
    let sessions: Vec<Session> = store.sessions();
    PopupView {
        user_name: store.user_name(),
        timer: TimerView::render(&state, durations, clock.now()),
        today: session::today_stats(&sessions, clock.today()).into(),
        total: session::total_stats(&sessions).into(),
    }
}

/// Background task that keeps the popup view fresh.
///
/// Re-renders on every poll tick and on every store-change notification.
pub async fn view_controller_task(controller: Arc<ViewController>) {
    info!("Starting view controller task");

    let mut changes = controller.store.subscribe();
    let mut poll = interval(POLL_INTERVAL);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                controller.refresh();
            }

            change = changes.recv() => {
                match change {
                    Ok(change) => {
                        debug!("View refreshing after change to {:?}", change.keys);
                        controller.refresh();
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("View missed {} store changes", missed);
                        controller.refresh();
                    }
                    Err(RecvError::Closed) => {
                        info!("Store closed, stopping view controller");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use tokio::time::{sleep, timeout};

    use super::*;
    use crate::clock::testing::ManualClock;

    fn controller() -> (Arc<ViewController>, Arc<Store>, Arc<ManualClock>) {
        let store = Arc::new(Store::in_memory());
        let durations = PhaseDurations::default();
        store.initialize("krit", &TimerState::idle(Phase::Focus, &durations)).unwrap();
        let clock = Arc::new(ManualClock::epoch());
        let controller = Arc::new(ViewController::new(store.clone(), clock.clone(), durations));
        (controller, store, clock)
    }

    fn session_on(clock: &ManualClock, date: NaiveDate) -> Session {
        Session::focus(clock.now(), date, 3000)
    }

    #[test]
    fn test_initial_view() {
        let (controller, _, _) = controller();
        let view = controller.current();
        assert_eq!(view.user_name.as_deref(), Some("krit"));
        assert_eq!(view.timer.display, "50:00");
        assert_eq!(view.today, StatsView { sessions: 0, time: "0m".to_string() });
    }

    #[test]
    fn test_stats_follow_the_store() {
        let (controller, store, clock) = controller();
        let today = clock.today();
        let yesterday = today.pred_opt().unwrap();
        for _ in 0..3 {
            store.append_session(session_on(&clock, yesterday)).unwrap();
        }
        store.append_session(session_on(&clock, today)).unwrap();

        let view = controller.refresh();
        assert_eq!(view.today, StatsView { sessions: 1, time: "50m".to_string() });
        assert_eq!(view.total, StatsView { sessions: 4, time: "3h 20m".to_string() });

        let logs = controller.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].label, "Today");
        assert_eq!(logs[1].label, "Yesterday");

        store.clear_sessions().unwrap();
        let cleared = controller.refresh();
        assert_eq!(cleared.total, StatsView { sessions: 0, time: "0m".to_string() });
        assert!(controller.logs().is_empty());
    }

    #[test]
    fn test_running_timer_is_rendered_from_deadline() {
        let (controller, store, clock) = controller();
        let mut state = store.timer_state_or(TimerState::default());
        state.start(clock.now());
        store.save_timer_state(&state).unwrap();

        clock.advance(ChronoDuration::seconds(90));
        let view = controller.refresh();
        assert_eq!(view.timer.display, "48:30");
        assert!(view.timer.show_pause);
        assert!(!view.timer.phase_switch_enabled);
    }

    #[test]
    fn test_calendar_navigation() {
        let (controller, store, clock) = controller();
        let today = clock.today();
        store.append_session(session_on(&clock, today)).unwrap();

        let current = controller.calendar().unwrap();
        assert_eq!((current.year, current.month), (today.year(), today.month()));
        assert!(current.days.iter().any(|d| d.today && d.has_sessions));

        let prev = controller.change_month(CalendarDirection::Prev).unwrap();
        assert_eq!((prev.year, prev.month), shift_month(today.year(), today.month(), -1));
        assert!(prev.days.iter().all(|d| !d.today));

        let back = controller.change_month(CalendarDirection::Next).unwrap();
        assert_eq!(back, current);

        assert!(controller.calendar_for(2024, 13).is_err());
        assert!("sideways".parse::<CalendarDirection>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_republishes_on_store_change() {
        let (controller, store, clock) = controller();
        let mut views = controller.subscribe();
        tokio::spawn(view_controller_task(controller.clone()));
        sleep(std::time::Duration::from_millis(10)).await;

        store.append_session(session_on(&clock, clock.today())).unwrap();
        timeout(std::time::Duration::from_secs(5), async {
            loop {
                views.changed().await.unwrap();
                if views.borrow_and_update().today.sessions == 1 {
                    break;
                }
            }
        })
        .await
        .unwrap();
    }
}
