//! Consumer-side reconnection tuning.

use serde::{Deserialize, Serialize};

/// Reconnection and timeout tuning for stream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base reconnect delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound on the exponential backoff delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Consecutive transport failures tolerated before the consumer stops
    /// retrying and requires a manual reconnect.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Timeout for establishing the stream connection, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Consecutive authentication failures after which a probable
    /// deployment misconfiguration is logged.
    #[serde(default = "default_auth_failure_threshold")]
    pub auth_failure_threshold: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            max_attempts: default_max_attempts(),
            connect_timeout_seconds: default_connect_timeout(),
            auth_failure_threshold: default_auth_failure_threshold(),
        }
    }
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_auth_failure_threshold() -> u32 {
    5
}
