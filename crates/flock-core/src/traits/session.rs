//! Session verification trait for pluggable authentication backends.
//!
//! Real session management (login, refresh, revocation) lives outside this
//! service. The notification pipeline only needs to resolve a bearer token
//! into an identity, so that is the whole seam.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Role, UserId};

/// The resolved identity behind an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// The authenticated user.
    pub user_id: UserId,
    /// Display name shown in logs and connection listings.
    pub display_name: String,
    /// The user's role.
    pub role: Role,
}

impl SessionIdentity {
    /// Check if this session belongs to an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Trait for resolving bearer tokens into session identities.
#[async_trait]
pub trait SessionVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a bearer token. Returns an `Authentication` error for
    /// unknown, expired, or malformed tokens.
    async fn verify(&self, token: &str) -> AppResult<SessionIdentity>;
}
