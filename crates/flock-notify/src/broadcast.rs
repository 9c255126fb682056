//! In-process notification broadcaster.
//!
//! The broadcaster owns a single publisher slot. The stream engine
//! registers itself at startup and is cleared on teardown; business code
//! only ever talks to the broadcaster. Broadcasting while no publisher is
//! registered is a normal state (server still starting, or shutting
//! down): the notification is dropped with a warning, never an error.

use std::sync::{Arc, RwLock};

use tracing::{debug, error, warn};

use flock_core::AppResult;

use crate::model::Notification;

/// Delivery backend the broadcaster hands notifications to.
pub trait NotificationPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver a notification. Returns the number of live connections it
    /// was written to.
    fn publish(&self, notification: &Notification) -> AppResult<usize>;
}

/// Single-slot handle between notification producers and the delivery
/// backend.
#[derive(Debug, Default)]
pub struct Broadcaster {
    publisher: RwLock<Option<Arc<dyn NotificationPublisher>>>,
}

impl Broadcaster {
    /// Create a broadcaster with an empty publisher slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the delivery backend. Replaces any previous publisher.
    pub fn set_publisher(&self, publisher: Arc<dyn NotificationPublisher>) {
        let mut slot = self
            .publisher
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *slot = Some(publisher);
    }

    /// Clear the publisher slot. Subsequent broadcasts drop with a warning.
    pub fn reset(&self) {
        let mut slot = self
            .publisher
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Whether a publisher is currently registered.
    pub fn is_registered(&self) -> bool {
        self.publisher
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Hand a notification to the registered publisher.
    ///
    /// Returns `true` when the publisher accepted it. A missing publisher
    /// or a publisher error is logged and swallowed; delivery failures
    /// must never propagate into the business action that produced the
    /// notification.
    pub fn broadcast(&self, notification: &Notification) -> bool {
        let publisher = {
            let slot = self.publisher.read().unwrap_or_else(|e| e.into_inner());
            slot.clone()
        };

        let Some(publisher) = publisher else {
            warn!(
                notification_id = %notification.id,
                kind = %notification.kind,
                "Dropping notification: no publisher registered"
            );
            return false;
        };

        match publisher.publish(notification) {
            Ok(delivered) => {
                debug!(
                    notification_id = %notification.id,
                    kind = %notification.kind,
                    priority = %notification.priority,
                    delivered,
                    "Notification broadcast"
                );
                true
            }
            Err(e) => {
                error!(
                    notification_id = %notification.id,
                    error = %e,
                    "Publisher failed to deliver notification"
                );
                false
            }
        }
    }
}
