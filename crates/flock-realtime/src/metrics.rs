//! Stream engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct StreamMetrics {
    /// Total connections ever opened.
    pub connections_opened: AtomicU64,
    /// Total connections closed.
    pub connections_closed: AtomicU64,
    /// Total frames queued to connections.
    pub frames_sent: AtomicU64,
    /// Total frames dropped (full buffers, dead connections).
    pub frames_dropped: AtomicU64,
    /// Total notifications accepted for fan-out.
    pub notifications_published: AtomicU64,
}

impl StreamMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an opened connection.
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection.
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record queued frames.
    pub fn frames_sent(&self, count: u64) {
        self.frames_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Record dropped frames.
    pub fn frames_dropped(&self, count: u64) {
        self.frames_dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a published notification.
    pub fn notification_published(&self) {
        self.notifications_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            notifications_published: self.notifications_published.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total connections ever opened.
    pub connections_opened: u64,
    /// Total connections closed.
    pub connections_closed: u64,
    /// Total frames queued to connections.
    pub frames_sent: u64,
    /// Total frames dropped.
    pub frames_dropped: u64,
    /// Total notifications accepted for fan-out.
    pub notifications_published: u64,
}
