//! Publish handlers — business events that produce notifications.
//!
//! Every handler validates its DTO, builds the notification through the
//! sender, and returns the created notification so the main application
//! can reference it.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use flock_core::error::AppError;
use flock_core::types::UserId;
use flock_notify::model::Notification;

use crate::dto::request::{
    ChangeMemberStatusRequest, CreateMembershipRequest, CreatePrayerRequest,
    PublishAlertRequest, PublishAnnouncementRequest, PublishEventRequest,
};
use crate::dto::response::ApiResponse;
use crate::extractors::{AdminUser, SessionUser};
use crate::state::AppState;

/// POST /api/admin/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<PublishAnnouncementRequest>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let notification = state
        .sender
        .announcement(&req.title, &req.body, req.announcement_id);
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/admin/events
pub async fn create_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<PublishEventRequest>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let notification =
        state
            .sender
            .event_created(&req.name, req.event_id, req.starts_at, &req.created_by);
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/admin/alerts
pub async fn create_alert(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<PublishAlertRequest>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let notification = state
        .sender
        .system_alert(&req.title, &req.message, req.priority);
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/admin/members/{id}/status
pub async fn change_member_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<UserId>,
    Json(req): Json<ChangeMemberStatusRequest>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let notification = state
        .sender
        .member_status_changed(id, &req.display_name, &req.status);
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/prayer-requests
pub async fn create_prayer_request(
    State(state): State<AppState>,
    session: SessionUser,
    Json(req): Json<CreatePrayerRequest>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let notification = state
        .sender
        .prayer_request(&session.display_name, req.is_anonymous);
    Ok(Json(ApiResponse::ok(notification)))
}

/// POST /api/membership-requests
pub async fn create_membership_request(
    State(state): State<AppState>,
    session: SessionUser,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let notification = state
        .sender
        .membership_request(&session.display_name, req.request_id);
    Ok(Json(ApiResponse::ok(notification)))
}
