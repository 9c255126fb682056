//! Stream wire protocol message definitions.
//!
//! Every stream frame is one JSON object with a `type` discriminator and
//! a `payload`. Unknown types on the receiving side are a parse error;
//! the consumer logs and skips them without dropping the connection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flock_core::types::{ConnectionId, NotificationId};

use crate::model::Notification;

/// Handshake payload, sent as the first message on every stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAck {
    /// The server-accepted connection identifier.
    pub connection_id: ConnectionId,
    /// How often the server emits heartbeats on this stream.
    pub heartbeat_interval_seconds: u64,
    /// Server clock at accept time.
    pub server_time: DateTime<Utc>,
}

/// Messages sent by the server over the notification stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Stream accepted.
    Connected(ConnectionAck),
    /// Snapshot of recent notifications visible to the session, already
    /// projected with the user's read flags and display-sorted.
    InitialNotifications(Vec<Notification>),
    /// A live notification delivery.
    Notification(Notification),
    /// Liveness signal.
    Heartbeat,
}

/// Control calls posted by the client outside the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Mark one notification read.
    MarkRead {
        /// The notification to mark.
        id: NotificationId,
    },
    /// Mark every visible notification read.
    MarkAllRead,
}
