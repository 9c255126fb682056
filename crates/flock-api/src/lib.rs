//! # flock-api
//!
//! HTTP API layer for Flock built on Axum.
//!
//! Provides the SSE notification stream endpoint, the notification
//! read-model and control endpoints, publish endpoints for business
//! events, middleware (rate limiting, CORS, logging), extractors, DTOs,
//! and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod sessions;
pub mod state;

pub use app::{build_state, run_server};
pub use router::build_router;
pub use sessions::StaticSessionRegistry;
pub use state::AppState;
