//! Named wake-ups for the timer engine

use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, sleep, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

/// One-shot wake-up at the end of a running phase
pub const COMPLETION_ALARM: &str = "focus-timer";
/// Repeating wake-up that refreshes the displayed remaining time
pub const TICK_ALARM: &str = "timer-tick";
/// Period of the tick alarm
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Schedules named one-shot and repeating wake-ups.
///
/// Every fire is delivered as the alarm name on the channel returned by
/// [`AlarmScheduler::new`]. Scheduling a name that is already pending
/// replaces it.
#[derive(Debug)]
pub struct AlarmScheduler {
    alarms: Mutex<HashMap<String, JoinHandle<()>>>,
    fired_tx: mpsc::UnboundedSender<String>,
}

impl AlarmScheduler {
    /// Create a scheduler and the receiving end of its fires
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            alarms: Mutex::new(HashMap::new()),
            fired_tx,
        };
        (scheduler, fired_rx)
    }

    /// Fire `name` once after `delay`
    pub fn schedule_once(&self, name: &str, delay: Duration) {
        let tx = self.fired_tx.clone();
        let alarm = name.to_string();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            debug!("Alarm fired: {}", alarm);
            let _ = tx.send(alarm);
        });
        debug!("Scheduled {} in {:?}", name, delay);
        self.insert(name, handle);
    }

    /// Fire `name` every `period`, first after one period
    pub fn schedule_repeating(&self, name: &str, period: Duration) {
        let tx = self.fired_tx.clone();
        let alarm = name.to_string();
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(alarm.clone()).is_err() {
                    break;
                }
            }
        });
        debug!("Scheduled {} every {:?}", name, period);
        self.insert(name, handle);
    }

    /// Cancel `name` if it is pending. Returns whether anything was cancelled.
    pub fn cancel(&self, name: &str) -> bool {
        let removed = match self.alarms.lock() {
            Ok(mut alarms) => alarms.remove(name),
            Err(e) => {
                warn!("Failed to lock alarms: {}", e);
                None
            }
        };
        match removed {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                if pending {
                    debug!("Cancelled alarm {}", name);
                }
                pending
            }
            None => false,
        }
    }

    /// Check if `name` is still going to fire
    pub fn is_scheduled(&self, name: &str) -> bool {
        self.alarms
            .lock()
            .map(|alarms| alarms.get(name).is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    fn insert(&self, name: &str, handle: JoinHandle<()>) {
        match self.alarms.lock() {
            Ok(mut alarms) => {
                if let Some(previous) = alarms.insert(name.to_string(), handle) {
                    previous.abort();
                }
            }
            Err(e) => {
                warn!("Failed to lock alarms, dropping {}: {}", name, e);
                handle.abort();
            }
        }
    }
}

impl Drop for AlarmScheduler {
    fn drop(&mut self) {
        if let Ok(alarms) = self.alarms.get_mut() {
            for (_, handle) in alarms.drain() {
                handle.abort();
            }
        }
    }
}
