//! Focus Timer - per-user Pomodoro timer engine with a web countdown view
//!
//! This is the main entry point for the focus-timer server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{api::create_router, config::Config, state::AppState, utils::shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "focus_timer={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting focus-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, auth_max_age={}s",
        config.host, config.port, config.auth_max_age_secs
    );

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        &config.bot_token,
        config.auth_max_age_secs,
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer/:user_id              - Countdown page");
    info!("  GET  /api/timer/:user_id/status   - Timer status snapshot");
    info!("  POST /api/timer/:user_id/start    - Start a timer (signed)");
    info!("  POST /api/timer/:user_id/pause    - Pause the timer (signed)");
    info!("  POST /api/timer/:user_id/resume   - Resume the timer (signed)");
    info!("  POST /api/timer/:user_id/stop     - Stop and log the timer (signed)");
    info!("  GET  /health                      - Health check");

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
