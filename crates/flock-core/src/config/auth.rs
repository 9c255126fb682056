//! Development session token configuration.
//!
//! Real authentication is an external collaborator. In development and in
//! tests the server seeds its session registry from this static table.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Static session token table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Known bearer tokens and the identities they resolve to.
    #[serde(default)]
    pub tokens: Vec<SessionTokenEntry>,
}

/// One bearer token and its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokenEntry {
    /// The bearer token value.
    pub token: String,
    /// The user this token authenticates as.
    pub user_id: UserId,
    /// Display name for logs and connection listings.
    pub display_name: String,
    /// Role granted to the session.
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Member
}
