//! Request DTOs with validation.
//!
//! Length caps on titles and bodies are the only sanitization this
//! service performs; content moderation lives in the main application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use flock_notify::model::Priority;

/// Publish an announcement (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PublishAnnouncementRequest {
    /// Announcement title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Announcement body.
    #[validate(length(min = 1, max = 2000, message = "Body must be 1-2000 characters"))]
    pub body: String,
    /// Id of the announcement record in the main application.
    pub announcement_id: Uuid,
}

/// Publish an event-created notification (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PublishEventRequest {
    /// Event name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Id of the event record in the main application.
    pub event_id: Uuid,
    /// When the event starts.
    pub starts_at: DateTime<Utc>,
    /// Display name of the organizer.
    #[validate(length(min = 1, max = 100))]
    pub created_by: String,
}

/// Publish a system alert (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PublishAlertRequest {
    /// Alert title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Alert message.
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    /// Alert priority. Defaults to medium.
    #[serde(default)]
    pub priority: Priority,
}

/// Submit a prayer request (member). The requester name is taken from
/// the session, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrayerRequest {
    /// Whether the requester asked to stay anonymous.
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Apply for membership (member). The applicant name is taken from the
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembershipRequest {
    /// Id of the application record in the main application.
    pub request_id: Uuid,
}

/// Change a member's status (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeMemberStatusRequest {
    /// The new status value.
    #[validate(length(min = 1, max = 50))]
    pub status: String,
    /// Display name of the affected member, for the notification text.
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
}
