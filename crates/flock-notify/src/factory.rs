//! Notification construction.
//!
//! [`Notification::create`] is the single fallible entry point that fills
//! generated fields and enforces audience validity.
//! [`NotificationFactory`] provides one constructor per business event so
//! call sites never hand-assemble kind/priority/audience combinations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use flock_core::types::{NotificationId, UserId};
use flock_core::{AppError, AppResult};

use crate::model::{
    Audience, Notification, NotificationKind, NotificationMetadata, Priority,
};

/// Caller-supplied fields for creating a notification.
#[derive(Debug, Clone)]
pub struct NotificationInput {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Priority; defaults to `Medium`.
    pub priority: Option<Priority>,
    /// Audience; defaults to `All`.
    pub audience: Option<Audience>,
    /// Optional expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Optional structured metadata.
    pub metadata: Option<NotificationMetadata>,
}

fn base(
    kind: NotificationKind,
    title: String,
    message: String,
    priority: Priority,
    audience: Audience,
) -> Notification {
    Notification {
        id: NotificationId::new(),
        title,
        message,
        kind,
        priority,
        audience,
        read: false,
        created_at: Utc::now(),
        expires_at: None,
        metadata: None,
    }
}

impl Notification {
    /// Build a notification from caller input.
    ///
    /// Fills a fresh unique id and `created_at`, starts `read` at false,
    /// and applies the `Medium` priority and `All` audience defaults.
    /// Rejects a `Specific` audience with no users.
    pub fn create(input: NotificationInput) -> AppResult<Self> {
        let audience = input.audience.unwrap_or(Audience::All);
        if let Audience::Specific { users } = &audience {
            if users.is_empty() {
                return Err(AppError::validation(
                    "Specific audience requires at least one target user",
                ));
            }
        }

        let mut notification = base(
            input.kind,
            input.title,
            input.message,
            input.priority.unwrap_or_default(),
            audience,
        );
        notification.expires_at = input.expires_at;
        notification.metadata = input.metadata;
        Ok(notification)
    }
}

/// Builds notifications for common business events.
pub struct NotificationFactory;

impl NotificationFactory {
    /// A church-wide announcement was published.
    pub fn announcement(title: &str, body: &str, announcement_id: Uuid) -> Notification {
        let mut n = base(
            NotificationKind::Announcement,
            title.to_string(),
            body.to_string(),
            Priority::Medium,
            Audience::All,
        );
        n.metadata = Some(NotificationMetadata::Announcement { announcement_id });
        n
    }

    /// A calendar event was created.
    pub fn event_created(
        name: &str,
        event_id: Uuid,
        starts_at: DateTime<Utc>,
        created_by: &str,
    ) -> Notification {
        let mut n = base(
            NotificationKind::Event,
            format!("New Event: {name}"),
            format!("{created_by} scheduled '{name}'"),
            Priority::Medium,
            Audience::Members,
        );
        n.metadata = Some(NotificationMetadata::Event {
            event_id,
            starts_at,
        });
        n
    }

    /// A member submitted a prayer request. Anonymous requests never carry
    /// the requester's name, in the message or the metadata.
    pub fn prayer_request(requester_name: &str, is_anonymous: bool) -> Notification {
        let display = if is_anonymous {
            "A member".to_string()
        } else {
            requester_name.to_string()
        };
        let mut n = base(
            NotificationKind::PrayerRequest,
            "New Prayer Request".to_string(),
            format!("{display} submitted a prayer request"),
            Priority::Medium,
            Audience::Admin,
        );
        n.metadata = Some(NotificationMetadata::PrayerRequest {
            requester_name: display,
            is_anonymous,
        });
        n
    }

    /// Someone applied for membership.
    pub fn membership_request(applicant_name: &str, request_id: Uuid) -> Notification {
        let mut n = base(
            NotificationKind::Admin,
            "New Membership Request".to_string(),
            format!("{applicant_name} applied for membership"),
            Priority::High,
            Audience::Admin,
        );
        n.metadata = Some(NotificationMetadata::MembershipRequest {
            request_id,
            applicant_name: applicant_name.to_string(),
        });
        n
    }

    /// A member's status changed.
    pub fn member_status_changed(
        user_id: UserId,
        display_name: &str,
        status: &str,
    ) -> Notification {
        let mut n = base(
            NotificationKind::Admin,
            "Member Status Updated".to_string(),
            format!("{display_name} is now {status}"),
            Priority::Low,
            Audience::Admin,
        );
        n.metadata = Some(NotificationMetadata::MemberStatus {
            user_id,
            status: status.to_string(),
        });
        n
    }

    /// A system-level alert with caller-chosen priority.
    pub fn system_alert(title: &str, message: &str, priority: Priority) -> Notification {
        base(
            NotificationKind::System,
            title.to_string(),
            message.to_string(),
            priority,
            Audience::All,
        )
    }
}
