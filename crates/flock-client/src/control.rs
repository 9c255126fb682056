//! Read-state control calls.

use flock_core::error::AppError;
use flock_core::result::AppResult;
use flock_core::types::NotificationId;
use flock_notify::wire::ControlRequest;

/// Posts read acknowledgements to the server.
///
/// The consumer flips its local feed first and fires these calls in a
/// detached task; a failure is logged and the local state kept.
/// Reconciliation happens through the snapshot on the next (re)connect.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ControlClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub async fn mark_read(&self, id: NotificationId) -> AppResult<()> {
        self.send(&ControlRequest::MarkRead { id }).await
    }

    pub async fn mark_all_read(&self) -> AppResult<()> {
        self.send(&ControlRequest::MarkAllRead).await
    }

    async fn send(&self, request: &ControlRequest) -> AppResult<()> {
        let url = format!("{}/api/notifications/ack", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::transport(format!("Control call failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::delivery(format!(
                "Control call rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
