//! Session extractors — pull the bearer token from the Authorization
//! header and resolve it through the configured [`SessionVerifier`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use flock_core::error::AppError;
use flock_core::traits::{SessionIdentity, SessionVerifier};

use crate::state::AppState;

/// Extracted authenticated session available in handlers.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionIdentity);

impl SessionUser {
    /// Returns the inner `SessionIdentity`.
    pub fn identity(&self) -> &SessionIdentity {
        &self.0
    }
}

impl std::ops::Deref for SessionUser {
    type Target = SessionIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let identity = state.sessions.verify(token).await?;
        Ok(SessionUser(identity))
    }
}

/// Admin-authenticated session. Non-admin roles are rejected with a 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionIdentity);

impl std::ops::Deref for AdminUser {
    type Target = SessionIdentity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionUser(identity) = SessionUser::from_request_parts(parts, state).await?;
        if !identity.is_admin() {
            return Err(AppError::authorization("Admin role required"));
        }
        Ok(AdminUser(identity))
    }
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))
}
