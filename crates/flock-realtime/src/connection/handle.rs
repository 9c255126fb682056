//! Individual stream connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use flock_core::traits::SessionIdentity;
use flock_core::types::{ConnectionId, Role, UserId};
use flock_notify::Audience;

/// A handle to a single stream connection.
///
/// Holds the sender half of the per-connection channel plus the identity
/// the connection was authenticated as. Channel payloads are frames
/// already serialized to JSON so fan-out never re-serializes per
/// connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID (client-generated or freshly assigned).
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: UserId,
    /// User's role (cached for audience checks).
    pub role: Role,
    /// Display name (cached for logs).
    pub display_name: String,
    /// Sender for outbound frames.
    pub sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    pub alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(id: ConnectionId, identity: &SessionIdentity, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            user_id: identity.user_id,
            role: identity.role,
            display_name: identity.display_name.clone(),
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a frame to this connection.
    ///
    /// A full buffer drops the frame with a warning; a closed channel
    /// marks the connection dead. Returns whether the frame was queued.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Connection send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Whether this connection's identity receives the given audience.
    pub fn receives(&self, audience: &Audience) -> bool {
        audience.matches(self.user_id, self.role)
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
