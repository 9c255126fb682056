//! Response DTOs.

use serde::{Deserialize, Serialize};

use flock_realtime::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: u64,
}

/// Result of a control (ack) call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    /// Number of notifications newly marked read.
    pub marked: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Whether the stream engine is registered as publisher.
    pub publisher_registered: bool,
    /// Active stream connections.
    pub connections: usize,
    /// Distinct connected users.
    pub connected_users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
