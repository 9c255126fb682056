//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use flock_core::config::AppConfig;
use flock_core::traits::SessionVerifier;
use flock_notify::broadcast::Broadcaster;
use flock_notify::sender::NotificationSender;
use flock_realtime::StreamEngine;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Sessions ─────────────────────────────────────────────
    /// Bearer-token session verifier
    pub sessions: Arc<dyn SessionVerifier>,

    // ── Notifications ────────────────────────────────────────
    /// Publisher slot between producers and the stream engine
    pub broadcaster: Arc<Broadcaster>,
    /// Business-event notification sender
    pub sender: Arc<NotificationSender>,
    /// Stream engine backing the SSE endpoint
    pub engine: Arc<StreamEngine>,

    // ── Middleware ───────────────────────────────────────────
    /// Token bucket limiter for admin publish routes
    pub rate_limiter: RateLimiter,
}
