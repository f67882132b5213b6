//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{app_state::Badge, CommandOutcome, Phase, TimerState},
    view::{controller::StatsView, LogEntry, TimerView},
};

/// Response to a timer command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `applied` or `ignored`
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
    pub view: TimerView,
}

impl ApiResponse {
    /// Create a response from a command outcome
    pub fn from_outcome(
        outcome: CommandOutcome,
        message: String,
        view: TimerView,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status: (if outcome.applied { "applied" } else { "ignored" }).to_string(),
            message,
            timestamp,
            timer: outcome.state,
            view,
        }
    }
}

/// Current timer state and its rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub timer: TimerState,
    pub view: TimerView,
}

/// Today's and all-time stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub today: StatsView,
    pub total: StatsView,
}

/// Session log grouped by day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub entries: Vec<LogEntry>,
    /// Set when there is nothing to show
    pub empty_message: Option<String>,
}

/// Response to clearing the session log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub total: StatsView,
}

/// Status response with engine metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub user_name: Option<String>,
    pub timer_running: bool,
    pub timer_remaining_seconds: u64,
    pub phase: Phase,
    pub badge: Badge,
    pub store_path: Option<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
