//! Per-connection heartbeat and lifetime timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::debug;

use flock_core::config::stream::StreamConfig;
use flock_notify::wire::StreamMessage;

use crate::connection::handle::ConnectionHandle;
use crate::hub::{StreamHub, encode};

/// Run the timer loop for one connection.
///
/// Emits a heartbeat frame every interval and closes the connection at
/// the max-lifetime deadline. The deadline closure is a normal event;
/// clients are expected to reconnect and resume from the snapshot.
pub async fn run_connection_timers(
    hub: Arc<StreamHub>,
    handle: Arc<ConnectionHandle>,
    config: StreamConfig,
) {
    let Some(heartbeat) = encode(&StreamMessage::Heartbeat) else {
        return;
    };

    let mut interval = time::interval(Duration::from_secs(config.heartbeat_interval_seconds));
    // The first tick completes immediately; consume it so heartbeats
    // start one full interval after the handshake.
    interval.tick().await;

    let lifetime = time::sleep(Duration::from_secs(config.max_connection_lifetime_seconds));
    tokio::pin!(lifetime);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !handle.is_alive() {
                    break;
                }
                if !handle.send(heartbeat.clone()) {
                    debug!(conn_id = %handle.id, "Heartbeat send failed, closing stream");
                    break;
                }
            }
            _ = &mut lifetime => {
                debug!(
                    conn_id = %handle.id,
                    lifetime_seconds = config.max_connection_lifetime_seconds,
                    "Max connection lifetime reached, closing stream"
                );
                break;
            }
        }
    }

    hub.unregister(&handle.id);
}
