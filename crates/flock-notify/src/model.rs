//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flock_core::types::{NotificationId, Role, UserId};

/// Kind of notification. Drives client presentation and the shape of the
/// attached metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Church-wide announcement.
    Announcement,
    /// Calendar event activity.
    Event,
    /// Prayer request submitted by a member.
    PrayerRequest,
    /// System-level notice.
    System,
    /// Administrative workflow item.
    Admin,
}

impl NotificationKind {
    /// Return the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::Event => "event",
            Self::PrayerRequest => "prayer_request",
            Self::System => "system",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification priority levels.
///
/// Declaration order is ascending so the derived `Ord` ranks `Urgent`
/// highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background events.
    Low,
    /// Standard events.
    Medium,
    /// Important events.
    High,
    /// Requires immediate attention.
    Urgent,
}

impl Priority {
    /// Whether this priority qualifies for an OS-level or toast alert.
    pub fn is_alert_worthy(&self) -> bool {
        matches!(self, Self::High | Self::Urgent)
    }

    /// Return the priority as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who a notification is delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Audience {
    /// Every connected session.
    All,
    /// Any authenticated member account, including admins.
    Members,
    /// Admin sessions only.
    Admin,
    /// An explicit set of users. Must not be empty; enforced at creation.
    Specific {
        /// The targeted users.
        users: Vec<UserId>,
    },
}

impl Audience {
    /// Check whether a session with the given identity receives this
    /// audience.
    pub fn matches(&self, user_id: UserId, role: Role) -> bool {
        match self {
            Self::All | Self::Members => true,
            Self::Admin => role.is_admin(),
            Self::Specific { users } => users.contains(&user_id),
        }
    }
}

/// Structured metadata attached to a notification, discriminated by the
/// business event that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationMetadata {
    /// Announcement reference.
    Announcement {
        /// The published announcement.
        announcement_id: Uuid,
    },
    /// Calendar event reference.
    Event {
        /// The event record.
        event_id: Uuid,
        /// When the event starts.
        starts_at: DateTime<Utc>,
    },
    /// Prayer request details.
    PrayerRequest {
        /// Requester display name, or a placeholder when anonymous.
        requester_name: String,
        /// Whether the requester asked to stay anonymous.
        is_anonymous: bool,
    },
    /// Membership application details.
    MembershipRequest {
        /// The application record.
        request_id: Uuid,
        /// Applicant display name.
        applicant_name: String,
    },
    /// Member status transition.
    MemberStatus {
        /// The affected user.
        user_id: UserId,
        /// The new status value.
        status: String,
    },
    /// System notice origin.
    System {
        /// Component that raised the notice.
        component: String,
    },
}

/// A notification delivered over the stream.
///
/// Immutable once created, except for the monotonic `read` flag which
/// only ever transitions `false` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Priority level.
    #[serde(default)]
    pub priority: Priority,
    /// Delivery audience.
    pub audience: Audience,
    /// Whether the viewing user has read this notification.
    pub read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification expires, if ever.
    pub expires_at: Option<DateTime<Utc>>,
    /// Structured metadata for the triggering event.
    pub metadata: Option<NotificationMetadata>,
}

impl Notification {
    /// Flip the read flag. The transition is one-way; calling this on an
    /// already-read notification is a no-op.
    pub fn mark_read(&mut self) {
        self.read = true;
    }

    /// Check if the notification has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    /// Check if the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Sort notifications for display: priority descending, then creation
/// time descending. The ordering is recomputed wherever a view is built
/// and never stored.
pub fn sort_for_display(items: &mut [Notification]) {
    items.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}
