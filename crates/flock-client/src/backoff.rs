//! Reconnect delay schedule.

use std::time::Duration;

use flock_core::config::client::ClientConfig;

/// Delay before retry `attempt` (0-based): `base × 2^attempt`, capped at
/// the configured maximum.
pub fn delay_for(attempt: u32, config: &ClientConfig) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    let delay_ms = config
        .base_delay_ms
        .saturating_mul(factor)
        .min(config.max_delay_ms);
    Duration::from_millis(delay_ms)
}
