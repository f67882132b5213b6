//! Focus Timer - A focus/break interval timer daemon
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{
    api::create_router,
    clock::{Clock, SystemClock},
    config::Config,
    services::{check_notifier_available, DesktopAlerts},
    state::{AppState, Phase, Store, TimerState},
    tasks::{resume_persisted_timer, timer_engine_task, AlarmScheduler},
    utils::shutdown_signal,
    view::{view_controller_task, ViewController},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    let durations = config.durations();
    info!("Starting focus-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, focus={}min, break={}min",
          config.host, config.port, config.focus_minutes, config.break_minutes);

    // Open the shared store and write install-time defaults
    let store_path = config.store_path();
    let store = Arc::new(Store::open(&store_path));
    store.initialize(&config.user_name, &TimerState::idle(Phase::Focus, &durations))?;
    info!("Using store at {}", store_path.display());

    let notify = !config.no_notify && check_notifier_available().await;
    let alerts = Arc::new(DesktopAlerts::new(notify, !config.no_sound, config.sound_file.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Create the timer engine
    let (scheduler, fired_rx) = AlarmScheduler::new();
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        scheduler,
        alerts,
        Arc::clone(&clock),
        durations,
        config.host.clone(),
        config.port,
    ));

    // Start the engine loop, then pick up a timer left running by a previous run
    let engine_state = Arc::clone(&state);
    tokio::spawn(async move {
        timer_engine_task(engine_state, fired_rx).await;
    });
    resume_persisted_timer(&state)?;

    // Start the view controller that keeps the popup view fresh
    let view = Arc::new(ViewController::new(Arc::clone(&store), clock, durations));
    tokio::spawn(view_controller_task(Arc::clone(&view)));

    // Create HTTP router with all endpoints
    let app = create_router(state, view);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timer              - Timer state and display");
    info!("  POST   /timer/start        - Start or resume");
    info!("  POST   /timer/pause        - Pause");
    info!("  POST   /timer/reset        - Reset the current phase");
    info!("  POST   /timer/phase/:phase - Switch to focus or break");
    info!("  GET    /view               - Popup view");
    info!("  GET    /stats              - Today and all-time stats");
    info!("  GET    /logs               - Session log by day");
    info!("  GET    /calendar           - Calendar month");
    info!("  POST   /calendar/:dir      - Previous or next month");
    info!("  DELETE /sessions?confirm=true - Clear all sessions");
    info!("  GET    /status             - Engine status");
    info!("  GET    /health             - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
