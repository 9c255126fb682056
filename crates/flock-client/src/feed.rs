//! Local notification feed state.

use flock_core::types::NotificationId;
use flock_notify::model::{Notification, sort_for_display};

/// Insertion-ordered notification list with an unread counter.
///
/// The feed mirrors what the server streams to one session: newest
/// first, duplicates ignored by id, unread count kept in lockstep with
/// the read flags.
#[derive(Debug, Default)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    unread: usize,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole feed with a server snapshot. The unread count
    /// is recomputed from the snapshot's read flags.
    pub fn replace_all(&mut self, items: Vec<Notification>) {
        self.unread = items.iter().filter(|n| !n.read).count();
        self.items = items;
    }

    /// Insert a live notification at the front. A duplicate id leaves
    /// the feed and the count untouched and returns false.
    pub fn insert(&mut self, notification: Notification) -> bool {
        if self.items.iter().any(|n| n.id == notification.id) {
            return false;
        }
        if !notification.read {
            self.unread += 1;
        }
        self.items.insert(0, notification);
        true
    }

    /// Flip one notification read. Returns true when the entry existed
    /// and was unread.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.mark_read();
                self.unread = self.unread.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Mark every notification read, returning how many flipped.
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for n in self.items.iter_mut().filter(|n| !n.read) {
            n.mark_read();
            flipped += 1;
        }
        self.unread = 0;
        flipped
    }

    /// Remove one notification locally. The server keeps its copy; a
    /// later snapshot may bring it back.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        match self.items.iter().position(|n| n.id == id) {
            Some(pos) => {
                let removed = self.items.remove(pos);
                if !removed.read {
                    self.unread = self.unread.saturating_sub(1);
                }
                true
            }
            None => false,
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.items.clear();
        self.unread = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Unexpired notifications in display order.
    pub fn visible(&self) -> Vec<Notification> {
        let mut view: Vec<Notification> = self
            .items
            .iter()
            .filter(|n| !n.is_expired())
            .cloned()
            .collect();
        sort_for_display(&mut view);
        view
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
