//! Static bearer-token session registry.
//!
//! Real session management lives in the main application; this registry
//! stands in behind the [`SessionVerifier`] seam. It is seeded from the
//! `[auth]` configuration table at startup and from fixtures in tests.

use async_trait::async_trait;
use dashmap::DashMap;

use flock_core::config::auth::AuthConfig;
use flock_core::error::AppError;
use flock_core::result::AppResult;
use flock_core::traits::{SessionIdentity, SessionVerifier};

/// In-memory token to identity table.
#[derive(Debug, Default)]
pub struct StaticSessionRegistry {
    tokens: DashMap<String, SessionIdentity>,
}

impl StaticSessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry from the configured token table.
    pub fn from_config(config: &AuthConfig) -> Self {
        let registry = Self::new();
        for entry in &config.tokens {
            registry.insert(
                entry.token.clone(),
                SessionIdentity {
                    user_id: entry.user_id,
                    display_name: entry.display_name.clone(),
                    role: entry.role,
                },
            );
        }
        registry
    }

    /// Add or replace a token.
    pub fn insert(&self, token: String, identity: SessionIdentity) {
        self.tokens.insert(token, identity);
    }

    /// Number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the registry has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl SessionVerifier for StaticSessionRegistry {
    async fn verify(&self, token: &str) -> AppResult<SessionIdentity> {
        self.tokens
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::authentication("Unknown or expired session token"))
    }
}
