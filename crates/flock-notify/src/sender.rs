//! Business-event notification sending.
//!
//! One method per business event so call sites never hand-assemble
//! notifications. Each method builds through the factory, hands the
//! result to the broadcaster, and returns the constructed notification
//! so callers can report it elsewhere (HTTP responses, audit trails).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use flock_core::AppResult;
use flock_core::types::UserId;

use crate::broadcast::Broadcaster;
use crate::factory::{NotificationFactory, NotificationInput};
use crate::model::{Notification, Priority};

/// Sends notifications for business events through the broadcaster.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    broadcaster: Arc<Broadcaster>,
}

impl NotificationSender {
    /// Create a new sender.
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Validate caller input, then broadcast.
    pub fn send(&self, input: NotificationInput) -> AppResult<Notification> {
        let notification = Notification::create(input)?;
        self.broadcaster.broadcast(&notification);
        Ok(notification)
    }

    fn dispatch(&self, notification: Notification) -> Notification {
        self.broadcaster.broadcast(&notification);
        notification
    }

    /// A church-wide announcement was published.
    pub fn announcement(&self, title: &str, body: &str, announcement_id: Uuid) -> Notification {
        self.dispatch(NotificationFactory::announcement(
            title,
            body,
            announcement_id,
        ))
    }

    /// A calendar event was created.
    pub fn event_created(
        &self,
        name: &str,
        event_id: Uuid,
        starts_at: DateTime<Utc>,
        created_by: &str,
    ) -> Notification {
        self.dispatch(NotificationFactory::event_created(
            name, event_id, starts_at, created_by,
        ))
    }

    /// A member submitted a prayer request.
    pub fn prayer_request(&self, requester_name: &str, is_anonymous: bool) -> Notification {
        self.dispatch(NotificationFactory::prayer_request(
            requester_name,
            is_anonymous,
        ))
    }

    /// Someone applied for membership.
    pub fn membership_request(&self, applicant_name: &str, request_id: Uuid) -> Notification {
        self.dispatch(NotificationFactory::membership_request(
            applicant_name,
            request_id,
        ))
    }

    /// A member's status changed.
    pub fn member_status_changed(
        &self,
        user_id: UserId,
        display_name: &str,
        status: &str,
    ) -> Notification {
        self.dispatch(NotificationFactory::member_status_changed(
            user_id,
            display_name,
            status,
        ))
    }

    /// A system-level alert.
    pub fn system_alert(&self, title: &str, message: &str, priority: Priority) -> Notification {
        self.dispatch(NotificationFactory::system_alert(title, message, priority))
    }
}
