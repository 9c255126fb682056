//! Notification read-model and control handlers.

use axum::Json;
use axum::extract::State;

use flock_core::error::AppError;
use flock_notify::model::Notification;
use flock_notify::wire::ControlRequest;

use crate::dto::response::{AckResponse, ApiResponse, CountResponse};
use crate::extractors::SessionUser;
use crate::state::AppState;

/// GET /api/notifications
///
/// Current snapshot for the session: audience-filtered, read flags
/// projected, display-sorted.
pub async fn list_notifications(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<Vec<Notification>>>, AppError> {
    let items = state.engine.snapshot_for(&session).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<ApiResponse<CountResponse>>, AppError> {
    let count = state.engine.unread_count(&session).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/notifications/ack
///
/// The control call: mark one notification read, or every visible one.
pub async fn ack(
    State(state): State<AppState>,
    session: SessionUser,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ApiResponse<AckResponse>>, AppError> {
    let marked = match request {
        ControlRequest::MarkRead { id } => {
            if state.engine.mark_read(&session, id).await? {
                1
            } else {
                0
            }
        }
        ControlRequest::MarkAllRead => state.engine.mark_all_read(&session).await?,
    };
    Ok(Json(ApiResponse::ok(AckResponse { marked })))
}
