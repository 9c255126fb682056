//! Stream hub — connection lifecycle and audience-filtered fan-out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use flock_core::config::stream::StreamConfig;
use flock_core::traits::SessionIdentity;
use flock_core::types::ConnectionId;
use flock_core::{AppError, AppResult};
use flock_notify::model::Notification;
use flock_notify::wire::StreamMessage;

use crate::connection::handle::ConnectionHandle;
use crate::connection::pool::ConnectionPool;
use crate::metrics::StreamMetrics;

/// Serialize a stream message to a frame, logging failures.
pub(crate) fn encode(message: &StreamMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(frame) => Some(frame),
        Err(e) => {
            error!(error = %e, "Failed to serialize stream message");
            None
        }
    }
}

/// Manages all active stream connections.
#[derive(Debug)]
pub struct StreamHub {
    pool: ConnectionPool,
    metrics: StreamMetrics,
    config: StreamConfig,
}

impl StreamHub {
    /// Creates a new hub.
    pub fn new(config: StreamConfig) -> Self {
        Self {
            pool: ConnectionPool::new(),
            metrics: StreamMetrics::new(),
            config,
        }
    }

    /// Registers a new authenticated connection.
    ///
    /// `handshake` frames are queued into the channel before the handle
    /// becomes visible to fan-out, so they are always the first frames a
    /// client reads. Returns the connection handle and the receiver for
    /// outbound frames. A reused connection id replaces the stale
    /// connection; a user over the per-user cap loses their oldest
    /// connection.
    pub fn register(
        &self,
        identity: &SessionIdentity,
        conn_id: ConnectionId,
        handshake: Vec<String>,
    ) -> AppResult<(Arc<ConnectionHandle>, mpsc::Receiver<String>)> {
        if let Some(stale) = self.pool.remove(&conn_id) {
            stale.mark_dead();
            self.metrics.connection_closed();
            warn!(conn_id = %conn_id, "Replacing stale connection with reused id");
        }

        let existing = self.pool.get_user_connections(&identity.user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                user_id = %identity.user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, closing oldest"
            );
            if let Some(oldest) = existing.first() {
                oldest.mark_dead();
                self.pool.remove(&oldest.id);
                self.metrics.connection_closed();
            }
        }

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(conn_id, identity, tx));
        for frame in handshake {
            if !handle.send(frame) {
                return Err(AppError::delivery(
                    "Failed to queue stream handshake frames",
                ));
            }
        }
        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %identity.user_id,
            role = %identity.role,
            "Stream connection registered"
        );

        Ok((handle, rx))
    }

    /// Unregisters a connection. Idempotent.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            self.metrics.connection_closed();
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "Stream connection unregistered"
            );
        }
    }

    /// Deliver a notification to every live connection whose identity
    /// matches its audience. The frame is serialized once. Returns the
    /// number of connections the frame was queued to.
    pub fn fan_out(&self, notification: &Notification) -> usize {
        if notification.is_expired() {
            debug!(
                notification_id = %notification.id,
                "Skipping fan-out of expired notification"
            );
            return 0;
        }
        let Some(frame) = encode(&StreamMessage::Notification(notification.clone())) else {
            return 0;
        };

        let mut delivered = 0u64;
        let mut dropped = 0u64;
        for handle in self.pool.all_connections() {
            if !handle.is_alive() || !handle.receives(&notification.audience) {
                continue;
            }
            if handle.send(frame.clone()) {
                delivered += 1;
            } else {
                dropped += 1;
            }
        }

        self.metrics.notification_published();
        self.metrics.frames_sent(delivered);
        self.metrics.frames_dropped(dropped);

        debug!(
            notification_id = %notification.id,
            delivered,
            dropped,
            "Notification fanned out"
        );
        delivered as usize
    }

    /// Close every connection. Used on shutdown.
    pub fn close_all(&self) {
        let connections = self.pool.all_connections();
        info!(count = connections.len(), "Closing all stream connections");
        for handle in connections {
            handle.mark_dead();
            self.pool.remove(&handle.id);
            self.metrics.connection_closed();
        }
    }

    /// Number of active connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Metrics counters.
    pub fn metrics(&self) -> &StreamMetrics {
        &self.metrics
    }
}
