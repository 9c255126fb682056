//! Maps domain `AppError` to HTTP responses.
//!
//! The `impl IntoResponse for AppError` itself lives in
//! `flock_core::error` because Rust's orphan rule requires the impl in
//! the crate that defines `AppError`. This module re-exports the
//! response body type for API consumers.

pub use flock_core::error::ApiErrorResponse;
