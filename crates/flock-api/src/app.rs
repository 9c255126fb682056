//! Application builder — wires broadcaster, stream engine, and sessions
//! into an Axum app.

use std::sync::Arc;

use flock_core::config::AppConfig;
use flock_core::error::AppError;
use flock_core::result::AppResult;
use flock_notify::{Broadcaster, NotificationSender};
use flock_realtime::{InMemoryReadStore, StreamEngine};

use crate::middleware::rate_limit::RateLimiter;
use crate::router::build_router;
use crate::sessions::StaticSessionRegistry;
use crate::state::AppState;

/// Build the shared application state from configuration.
///
/// Integration tests call this directly to assemble an app without a
/// listener.
pub fn build_state(config: AppConfig) -> AppState {
    // ── Step 1: Read store + stream engine ───────────────────────
    let read_store = Arc::new(InMemoryReadStore::new());
    let engine = Arc::new(StreamEngine::new(config.stream.clone(), read_store));

    // ── Step 2: Broadcaster with the engine as its publisher ─────
    let broadcaster = Arc::new(Broadcaster::new());
    broadcaster.set_publisher(engine.clone());

    // ── Step 3: Notification sender ──────────────────────────────
    let sender = Arc::new(NotificationSender::new(Arc::clone(&broadcaster)));

    // ── Step 4: Session registry ─────────────────────────────────
    let sessions = StaticSessionRegistry::from_config(&config.auth);
    if sessions.is_empty() {
        tracing::warn!("No session tokens configured, every request will be rejected");
    }

    // ── Step 5: Rate limiter for admin publish routes ────────────
    let rate_limiter = RateLimiter::from_config(&config.server.rate_limit);

    AppState {
        config: Arc::new(config),
        sessions: Arc::new(sessions),
        broadcaster,
        sender,
        engine,
        rate_limiter,
    }
}

/// Runs the Flock server with the given configuration.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Flock server...");

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = build_state(config);
    let broadcaster = Arc::clone(&state.broadcaster);
    let engine = Arc::clone(&state.engine);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Flock server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // Listener is closed; detach the publisher and drop open streams.
    broadcaster.reset();
    engine.shutdown();

    tracing::info!("Flock server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
