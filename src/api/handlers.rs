//! HTTP endpoint handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::{
    responses::{
        ApiResponse, ClearResponse, HealthResponse, LogsResponse, StatsResponse, StatusResponse,
        TimerResponse,
    },
    ApiState,
};
use crate::{
    error::{Error, Result},
    state::{session, CommandOutcome, Phase},
    view::{logs::EMPTY_LOG_MESSAGE, CalendarDirection, CalendarMonth, PopupView, TimerView},
};

/// Map an error to a status code, logging it
fn status_for(context: &str, e: &Error) -> StatusCode {
    match e {
        Error::ConfirmationRequired
        | Error::InvalidPhase(_)
        | Error::InvalidDirection(_)
        | Error::InvalidMonth { .. } => {
            warn!("{}: {}", context, e);
            StatusCode::BAD_REQUEST
        }
        _ => {
            error!("{}: {}", context, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn command_response(
    state: &ApiState,
    name: &str,
    result: Result<CommandOutcome>,
) -> std::result::Result<Json<ApiResponse>, StatusCode> {
    let outcome = result.map_err(|e| status_for(&format!("Failed to {}", name), &e))?;
    let message = if outcome.applied {
        info!("{} command applied", name);
        format!("Timer {}", past_tense(name))
    } else {
        format!("Timer {} ignored in the current state", name)
    };
    let now = state.engine.now();
    let view = TimerView::render(&outcome.state, &state.engine.durations, now);
    Ok(Json(ApiResponse::from_outcome(outcome, message, view, now)))
}

fn past_tense(name: &str) -> &str {
    match name {
        "start" => "started",
        "pause" => "paused",
        "reset" => "reset",
        _ => "updated",
    }
}

/// Handle GET /timer - Current timer state and rendering
pub async fn timer_handler(State(state): State<ApiState>) -> Json<TimerResponse> {
    let timer = state.engine.timer_state();
    let view = TimerView::render(&timer, &state.engine.durations, state.engine.now());
    Json(TimerResponse { timer, view })
}

/// Handle POST /timer/start - Start or resume the current phase
pub async fn start_handler(State(state): State<ApiState>) -> std::result::Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.start_timer();
    command_response(&state, "start", result)
}

/// Handle POST /timer/pause - Pause the running phase
pub async fn pause_handler(State(state): State<ApiState>) -> std::result::Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.pause_timer();
    command_response(&state, "pause", result)
}

/// Handle POST /timer/reset - Restore the full duration of the current phase
pub async fn reset_handler(State(state): State<ApiState>) -> std::result::Result<Json<ApiResponse>, StatusCode> {
    let result = state.engine.reset_timer();
    command_response(&state, "reset", result)
}

/// Handle POST /timer/phase/:phase - Switch between focus and break
pub async fn phase_handler(
    State(state): State<ApiState>,
    Path(phase): Path<String>,
) -> std::result::Result<Json<ApiResponse>, StatusCode> {
    let phase: Phase = phase
        .parse()
        .map_err(|e| status_for("Rejected phase switch", &e))?;
    let result = state.engine.switch_phase(phase);
    command_response(&state, "switch phase", result)
}

/// Handle GET /view - Latest popup view published by the view controller
pub async fn view_handler(State(state): State<ApiState>) -> Json<PopupView> {
    Json(state.view.current())
}

/// Handle GET /stats - Today's and all-time stats
pub async fn stats_handler(State(state): State<ApiState>) -> Json<StatsResponse> {
    let sessions = state.engine.sessions();
    let today = state.engine.today();
    Json(StatsResponse {
        today: session::today_stats(&sessions, today).into(),
        total: session::total_stats(&sessions).into(),
    })
}

/// Handle GET /logs - Session log grouped by day
pub async fn logs_handler(State(state): State<ApiState>) -> Json<LogsResponse> {
    let entries = state.view.logs();
    let empty_message = entries.is_empty().then(|| EMPTY_LOG_MESSAGE.to_string());
    Json(LogsResponse { entries, empty_message })
}

/// Query for an explicit calendar month
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Handle GET /calendar - Calendar for the current or requested month
pub async fn calendar_handler(
    State(state): State<ApiState>,
    Query(query): Query<CalendarQuery>,
) -> std::result::Result<Json<CalendarMonth>, StatusCode> {
    let result = match (query.year, query.month) {
        (Some(year), Some(month)) => state.view.calendar_for(year, month),
        _ => state.view.calendar(),
    };
    result
        .map(Json)
        .map_err(|e| status_for("Failed to build calendar", &e))
}

/// Handle POST /calendar/:direction - Move the calendar one month
pub async fn calendar_nav_handler(
    State(state): State<ApiState>,
    Path(direction): Path<String>,
) -> std::result::Result<Json<CalendarMonth>, StatusCode> {
    direction
        .parse::<CalendarDirection>()
        .and_then(|direction| state.view.change_month(direction))
        .map(Json)
        .map_err(|e| status_for("Failed to move calendar", &e))
}

/// Query confirming a destructive operation
#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Handle DELETE /sessions?confirm=true - Clear the whole session log
pub async fn clear_sessions_handler(
    State(state): State<ApiState>,
    Query(query): Query<ClearQuery>,
) -> std::result::Result<Json<ClearResponse>, StatusCode> {
    state
        .engine
        .clear_sessions(query.confirm)
        .map_err(|e| status_for("Refused to clear sessions", &e))?;

    Ok(Json(ClearResponse {
        message: "All session logs cleared".to_string(),
        timestamp: state.engine.now(),
        total: session::total_stats(&state.engine.sessions()).into(),
    }))
}

/// Handle GET /status - Engine status and metadata
pub async fn status_handler(State(state): State<ApiState>) -> Json<StatusResponse> {
    let engine = &state.engine;
    let timer = engine.timer_state();
    let (last_action, last_action_time) = engine.get_last_action();

    Json(StatusResponse {
        user_name: engine.store.user_name(),
        timer_running: timer.is_running(),
        timer_remaining_seconds: timer.remaining_at(engine.now()),
        phase: timer.current_phase,
        badge: engine.badge(),
        store_path: engine.store.path().map(|p| p.display().to_string()),
        uptime: engine.get_uptime(),
        port: engine.port,
        host: engine.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.engine.now()))
}
