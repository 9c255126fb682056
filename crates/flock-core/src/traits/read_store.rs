//! Per-user read-state store trait.
//!
//! Durable persistence is an external collaborator; the pipeline only
//! records which notification ids a user has read. Read state is
//! monotonic: ids are only ever added, never cleared back to unread.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{NotificationId, UserId};

/// Trait for read-state backends (in-memory, database, ...).
#[async_trait]
pub trait ReadStateStore: Send + Sync + std::fmt::Debug + 'static {
    /// Mark one notification read for a user.
    /// Returns `true` if the id was newly marked, `false` if already read.
    async fn mark_read(&self, user: UserId, notification: NotificationId) -> AppResult<bool>;

    /// Mark a batch of notifications read for a user.
    /// Returns the number of ids newly marked.
    async fn mark_many_read(
        &self,
        user: UserId,
        notifications: &[NotificationId],
    ) -> AppResult<u64>;

    /// Return every notification id the user has read.
    async fn read_ids(&self, user: UserId) -> AppResult<HashSet<NotificationId>>;
}
