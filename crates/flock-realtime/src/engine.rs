//! Stream engine.
//!
//! Owns the connection hub, the recent-notification buffer, and the
//! read-state store, and implements [`NotificationPublisher`] so a
//! `Broadcaster` can fan notifications out through it. The HTTP layer
//! talks to the engine; the engine talks to the hub.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;

use flock_core::AppResult;
use flock_core::config::stream::StreamConfig;
use flock_core::traits::{ReadStateStore, SessionIdentity};
use flock_core::types::{ConnectionId, NotificationId};
use flock_notify::broadcast::NotificationPublisher;
use flock_notify::model::Notification;
use flock_notify::wire::{ConnectionAck, StreamMessage};

use crate::heartbeat::run_connection_timers;
use crate::hub::StreamHub;
use crate::metrics::MetricsSnapshot;
use crate::recent::RecentNotifications;

/// Server-side engine behind the notification stream endpoint.
#[derive(Debug)]
pub struct StreamEngine {
    hub: Arc<StreamHub>,
    recent: RecentNotifications,
    read_store: Arc<dyn ReadStateStore>,
    config: StreamConfig,
}

impl StreamEngine {
    pub fn new(config: StreamConfig, read_store: Arc<dyn ReadStateStore>) -> Self {
        Self {
            hub: Arc::new(StreamHub::new(config.clone())),
            recent: RecentNotifications::new(config.recent_buffer_size),
            read_store,
            config,
        }
    }

    /// Open a stream for an authenticated session.
    ///
    /// The handshake (`connected`, then `initial_notifications`) is queued
    /// ahead of any live traffic, and a timer task is spawned to drive
    /// heartbeats and the lifetime deadline. Callers read frames off the
    /// returned receiver until it closes.
    pub async fn connect(
        &self,
        identity: &SessionIdentity,
        connection_id: Option<ConnectionId>,
    ) -> AppResult<(ConnectionId, mpsc::Receiver<String>)> {
        let conn_id = connection_id.unwrap_or_else(ConnectionId::new);
        let snapshot = self.snapshot_for(identity).await?;

        let ack = StreamMessage::Connected(ConnectionAck {
            connection_id: conn_id,
            heartbeat_interval_seconds: self.config.heartbeat_interval_seconds,
            server_time: Utc::now(),
        });
        let initial = StreamMessage::InitialNotifications(snapshot);
        let handshake = vec![
            serde_json::to_string(&ack)?,
            serde_json::to_string(&initial)?,
        ];

        let (handle, rx) = self.hub.register(identity, conn_id, handshake)?;
        tokio::spawn(run_connection_timers(
            self.hub.clone(),
            handle,
            self.config.clone(),
        ));

        Ok((conn_id, rx))
    }

    /// Per-user view of the recent buffer with read flags applied.
    pub async fn snapshot_for(&self, identity: &SessionIdentity) -> AppResult<Vec<Notification>> {
        let read_ids = self.read_store.read_ids(identity.user_id).await?;
        Ok(self.recent.snapshot_for(identity, &read_ids))
    }

    /// Mark one notification read for the session's user.
    /// Returns `true` if it was newly marked.
    pub async fn mark_read(
        &self,
        identity: &SessionIdentity,
        notification: NotificationId,
    ) -> AppResult<bool> {
        self.read_store
            .mark_read(identity.user_id, notification)
            .await
    }

    /// Mark every notification currently visible to the session read.
    /// Returns the number of ids newly marked.
    pub async fn mark_all_read(&self, identity: &SessionIdentity) -> AppResult<u64> {
        let visible = self.recent.visible_ids(identity);
        if visible.is_empty() {
            return Ok(0);
        }
        self.read_store
            .mark_many_read(identity.user_id, &visible)
            .await
    }

    /// Count of unread notifications currently visible to the session.
    pub async fn unread_count(&self, identity: &SessionIdentity) -> AppResult<u64> {
        let read_ids = self.read_store.read_ids(identity.user_id).await?;
        let unread = self
            .recent
            .visible_ids(identity)
            .into_iter()
            .filter(|id| !read_ids.contains(id))
            .count();
        Ok(unread as u64)
    }

    /// Drop a single connection. Idempotent.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        self.hub.unregister(conn_id);
    }

    /// Close every connection. Used on shutdown.
    pub fn shutdown(&self) {
        info!("Stream engine shutting down");
        self.hub.close_all();
    }

    /// Number of active connections.
    pub fn connection_count(&self) -> usize {
        self.hub.connection_count()
    }

    /// Number of distinct connected users.
    pub fn user_count(&self) -> usize {
        self.hub.user_count()
    }

    /// Point-in-time metrics counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.hub.metrics().snapshot()
    }
}

impl NotificationPublisher for StreamEngine {
    fn publish(&self, notification: &Notification) -> AppResult<usize> {
        self.recent.record(notification.clone());
        Ok(self.hub.fan_out(notification))
    }
}
