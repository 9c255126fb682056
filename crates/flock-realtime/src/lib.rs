//! # flock-realtime
//!
//! Server-side notification stream engine: connection handles and pool,
//! audience-filtered fan-out, the recent-notification buffer that feeds
//! initial snapshots, per-connection heartbeat and lifetime timers, and
//! the engine that implements the broadcaster's publisher seam.

pub mod connection;
pub mod engine;
pub mod heartbeat;
pub mod hub;
pub mod metrics;
pub mod read_store;
pub mod recent;

pub use connection::handle::ConnectionHandle;
pub use connection::pool::ConnectionPool;
pub use engine::StreamEngine;
pub use hub::StreamHub;
pub use metrics::{MetricsSnapshot, StreamMetrics};
pub use read_store::InMemoryReadStore;
pub use recent::RecentNotifications;
