//! Notification stream engine configuration.

use serde::{Deserialize, Serialize};

/// Server-side stream engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Heartbeat interval in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Maximum connection lifetime in seconds. Connections are closed
    /// normally at this deadline and clients reconnect; kept just under
    /// five minutes so intermediary proxies never kill the stream first.
    #[serde(default = "default_max_lifetime")]
    pub max_connection_lifetime_seconds: u64,
    /// Per-connection outbound channel buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum concurrent stream connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// How many recently broadcast notifications are retained for the
    /// initial snapshot sent to new connections.
    #[serde(default = "default_recent_buffer")]
    pub recent_buffer_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            max_connection_lifetime_seconds: default_max_lifetime(),
            channel_buffer_size: default_channel_buffer(),
            max_connections_per_user: default_max_connections_per_user(),
            recent_buffer_size: default_recent_buffer(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    25
}

fn default_max_lifetime() -> u64 {
    290
}

fn default_channel_buffer() -> usize {
    64
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_recent_buffer() -> usize {
    100
}
