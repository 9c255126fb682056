//! In-memory read-state store.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use flock_core::AppResult;
use flock_core::traits::ReadStateStore;
use flock_core::types::{NotificationId, UserId};

/// Read-state store backed by a process-local map. The shipped adapter
/// for deployments without a durable store.
#[derive(Debug, Default)]
pub struct InMemoryReadStore {
    read: DashMap<UserId, HashSet<NotificationId>>,
}

impl InMemoryReadStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadStateStore for InMemoryReadStore {
    async fn mark_read(&self, user: UserId, notification: NotificationId) -> AppResult<bool> {
        Ok(self.read.entry(user).or_default().insert(notification))
    }

    async fn mark_many_read(
        &self,
        user: UserId,
        notifications: &[NotificationId],
    ) -> AppResult<u64> {
        let mut set = self.read.entry(user).or_default();
        let mut added = 0u64;
        for id in notifications {
            if set.insert(*id) {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn read_ids(&self, user: UserId) -> AppResult<HashSet<NotificationId>> {
        Ok(self
            .read
            .get(&user)
            .map(|set| set.clone())
            .unwrap_or_default())
    }
}
