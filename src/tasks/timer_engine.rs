//! Timer engine background task

use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, error, info, warn};

use crate::state::{
    store::{SESSIONS_KEY, TIMER_STATE_KEY},
    AppState,
};

/// Background task that reacts to fired alarms and store changes.
///
/// Alarm fires are routed to the engine's tick handling. A change to the
/// session log refreshes the badge, and a timer state that is no longer
/// running drops any wake-ups left behind.
pub async fn timer_engine_task(state: Arc<AppState>, mut fired_rx: mpsc::UnboundedReceiver<String>) {
    info!("Starting timer engine task");

    let mut changes = state.store.subscribe();
    state.update_badge();

    loop {
        tokio::select! {
            alarm = fired_rx.recv() => {
                let Some(name) = alarm else {
                    info!("Alarm channel closed, stopping timer engine");
                    break;
                };
                match state.handle_alarm(&name) {
                    Ok(tick) => debug!("Alarm {} handled: {:?}", name, tick),
                    Err(e) => error!("Failed to handle alarm {}: {}", name, e),
                }
            }

            change = changes.recv() => {
                match change {
                    Ok(change) => {
                        if change.touches(SESSIONS_KEY) {
                            state.update_badge();
                        }
                        if change.touches(TIMER_STATE_KEY) {
                            if let Err(e) = state.drop_orphaned_alarms() {
                                error!("Failed to check for orphaned alarms: {}", e);
                            }
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Timer engine missed {} store changes, resyncing", missed);
                        state.update_badge();
                    }
                    Err(RecvError::Closed) => {
                        info!("Store closed, stopping timer engine");
                        break;
                    }
                }
            }
        }
    }
}
