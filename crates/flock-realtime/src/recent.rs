//! Bounded buffer of recently broadcast notifications.
//!
//! Every broadcast notification is recorded here so new connections can
//! receive an initial snapshot. The buffer is process-lifetime only;
//! durable notification history is an external collaborator. Stored
//! copies always carry `read = false`; per-user read flags are projected
//! at snapshot time.

use std::collections::{HashSet, VecDeque};
use std::sync::RwLock;

use chrono::Utc;

use flock_core::traits::SessionIdentity;
use flock_core::types::NotificationId;
use flock_notify::model::{Notification, sort_for_display};

/// Ring of the most recently broadcast notifications, newest first.
#[derive(Debug)]
pub struct RecentNotifications {
    cap: usize,
    items: RwLock<VecDeque<Notification>>,
}

impl RecentNotifications {
    /// Create a buffer retaining up to `cap` notifications.
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            items: RwLock::new(VecDeque::with_capacity(cap)),
        }
    }

    /// Record a broadcast notification, evicting the oldest past capacity.
    pub fn record(&self, notification: Notification) {
        let mut items = self.items.write().unwrap_or_else(|e| e.into_inner());
        items.push_front(notification);
        items.truncate(self.cap);
    }

    /// Build the per-user snapshot: audience-filtered, expiry-filtered,
    /// read flags projected from `read_ids`, display-sorted.
    pub fn snapshot_for(
        &self,
        identity: &SessionIdentity,
        read_ids: &HashSet<NotificationId>,
    ) -> Vec<Notification> {
        let now = Utc::now();
        let mut visible: Vec<Notification> = {
            let items = self.items.read().unwrap_or_else(|e| e.into_inner());
            items
                .iter()
                .filter(|n| !n.is_expired_at(now))
                .filter(|n| n.audience.matches(identity.user_id, identity.role))
                .cloned()
                .collect()
        };
        for n in &mut visible {
            n.read = read_ids.contains(&n.id);
        }
        sort_for_display(&mut visible);
        visible
    }

    /// Ids currently visible to the identity (audience + expiry filtered).
    pub fn visible_ids(&self, identity: &SessionIdentity) -> Vec<NotificationId> {
        let now = Utc::now();
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        items
            .iter()
            .filter(|n| !n.is_expired_at(now))
            .filter(|n| n.audience.matches(identity.user_id, identity.role))
            .map(|n| n.id)
            .collect()
    }

    /// Number of buffered notifications.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
