//! The stream consumer: one owning task per connection.
//!
//! All connection work (opening the stream, decoding frames, backoff
//! scheduling, teardown) happens on a single spawned task, so there are
//! no shared reconnect flags to race on. The handle talks to the task
//! through a command channel and a cancellation token, and observes its
//! lifecycle on a watch channel.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use flock_core::config::client::ClientConfig;
use flock_core::error::AppError;
use flock_core::result::AppResult;
use flock_core::types::{ConnectionId, NotificationId, Role};
use flock_notify::model::Notification;
use flock_notify::wire::StreamMessage;

use crate::alerts::{AlertRouter, SurfaceFlag, SystemNotifier, ToastSink};
use crate::backoff::delay_for;
use crate::control::ControlClient;
use crate::feed::NotificationFeed;
use crate::sse::SseDecoder;

/// Connection lifecycle as observed from outside the owning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not running: before the first connect, or after teardown.
    Idle,
    /// Opening the stream.
    Connecting,
    /// Stream established and consuming.
    Connected,
    /// Automatic reconnection exhausted; parked until `reconnect()`.
    Disconnected,
}

/// Everything needed to run one consumer.
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    /// Server base URL, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Bearer token for the session.
    pub token: String,
    /// Role of the authenticated viewer; drives alert routing.
    pub viewer_role: Role,
    /// Reconnection and timeout tuning.
    pub client: ClientConfig,
    /// Shared surface visibility flag.
    pub surface: SurfaceFlag,
    /// OS notification sink.
    pub system: Arc<dyn SystemNotifier>,
    /// In-app toast sink.
    pub toasts: Arc<dyn ToastSink>,
}

#[derive(Debug)]
enum Command {
    Reconnect,
}

/// Handle to a running consumer task.
#[derive(Debug)]
pub struct NotificationConsumer {
    connection_id: ConnectionId,
    feed: Arc<Mutex<NotificationFeed>>,
    control: ControlClient,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl NotificationConsumer {
    /// Spawn the owning connection task and return its handle.
    pub fn spawn(options: ConsumerOptions) -> AppResult<Self> {
        let mut options = options;
        options.base_url = options.base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(options.client.connect_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {e}")))?;

        let connection_id = ConnectionId::new();
        let feed = Arc::new(Mutex::new(NotificationFeed::new()));
        let control = ControlClient::new(
            http.clone(),
            options.base_url.clone(),
            options.token.clone(),
        );
        let router = AlertRouter::new(
            options.viewer_role,
            options.surface.clone(),
            Arc::clone(&options.system),
            Arc::clone(&options.toasts),
        );

        let (command_tx, command_rx) = mpsc::channel(8);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let cancel = CancellationToken::new();

        let actor = ConsumerActor {
            options,
            http,
            connection_id,
            feed: Arc::clone(&feed),
            router,
            state_tx,
            commands: command_rx,
            cancel: cancel.clone(),
            stall: Duration::from_secs(10),
        };
        let task = tokio::spawn(actor.run());

        Ok(Self {
            connection_id,
            feed,
            control,
            commands: command_tx,
            state: state_rx,
            cancel,
            task,
        })
    }

    /// The connection id this consumer presents to the server.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch receiver for observing state transitions.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Unexpired notifications in display order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock_feed().visible()
    }

    pub fn unread_count(&self) -> usize {
        self.lock_feed().unread_count()
    }

    /// Optimistically mark one notification read, then acknowledge it
    /// to the server. The local flip is kept even when the call fails.
    pub fn mark_read(&self, id: NotificationId) -> bool {
        let flipped = self.lock_feed().mark_read(id);
        let control = self.control.clone();
        tokio::spawn(async move {
            if let Err(e) = control.mark_read(id).await {
                warn!(
                    notification_id = %id,
                    error = %e,
                    "Read acknowledgement failed, keeping local state"
                );
            }
        });
        flipped
    }

    /// Optimistically mark everything read, then acknowledge in bulk.
    pub fn mark_all_read(&self) -> usize {
        let flipped = self.lock_feed().mark_all_read();
        let control = self.control.clone();
        tokio::spawn(async move {
            if let Err(e) = control.mark_all_read().await {
                warn!(error = %e, "Bulk read acknowledgement failed, keeping local state");
            }
        });
        flipped
    }

    /// Dismiss a notification locally. The server is not informed, so
    /// the next snapshot may restore it.
    pub fn remove(&self, id: NotificationId) -> bool {
        self.lock_feed().remove(id)
    }

    /// Clear the local feed.
    pub fn clear_all(&self) {
        self.lock_feed().clear();
    }

    /// Reset the failure counter and force a fresh connection attempt
    /// from any state.
    pub fn reconnect(&self) {
        // A full buffer already holds a pending reconnect.
        let _ = self.commands.try_send(Command::Reconnect);
    }

    /// Tear the consumer down: close the connection, stop the task, and
    /// park the state at Idle.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    fn lock_feed(&self) -> MutexGuard<'_, NotificationFeed> {
        self.feed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

enum Open {
    Opened(reqwest::Response),
    AuthRejected(reqwest::StatusCode),
    Failed,
    Cancelled,
}

enum StreamEnd {
    Closed,
    Faulted,
    Reconnect,
    Cancelled,
}

enum Wait {
    Elapsed,
    Reconnect,
    Cancelled,
}

struct ConsumerActor {
    options: ConsumerOptions,
    http: reqwest::Client,
    connection_id: ConnectionId,
    feed: Arc<Mutex<NotificationFeed>>,
    router: AlertRouter,
    state_tx: watch::Sender<ConnectionState>,
    commands: mpsc::Receiver<Command>,
    cancel: CancellationToken,
    stall: Duration,
}

impl ConsumerActor {
    async fn run(mut self) {
        let mut failures: u32 = 0;
        let mut auth_failures: u32 = 0;

        loop {
            self.publish(ConnectionState::Connecting);
            match self.open_stream().await {
                Open::Opened(response) => {
                    failures = 0;
                    auth_failures = 0;
                    self.publish(ConnectionState::Connected);
                    match self.consume(response).await {
                        StreamEnd::Cancelled => break,
                        StreamEnd::Reconnect => continue,
                        StreamEnd::Closed | StreamEnd::Faulted => {}
                    }
                }
                Open::Cancelled => break,
                Open::AuthRejected(status) => {
                    // Counted apart from transport failures: the session
                    // may simply not be established yet. Retries stay
                    // quiet and unbounded.
                    auth_failures += 1;
                    if auth_failures == self.options.client.auth_failure_threshold {
                        error!(
                            status = %status,
                            attempts = auth_failures,
                            "Stream authentication keeps failing, likely a deployment misconfiguration"
                        );
                    } else {
                        debug!(
                            status = %status,
                            attempts = auth_failures,
                            "Stream not authenticated yet, retrying quietly"
                        );
                    }
                    match self.wait(delay_for(
                        auth_failures.saturating_sub(1),
                        &self.options.client,
                    ))
                    .await
                    {
                        Wait::Cancelled => break,
                        Wait::Reconnect => {
                            auth_failures = 0;
                        }
                        Wait::Elapsed => {}
                    }
                    continue;
                }
                Open::Failed => {}
            }

            // Transport failure edge: the open failed or the stream
            // ended, normally or otherwise.
            failures += 1;
            if failures >= self.options.client.max_attempts {
                warn!(
                    attempts = failures,
                    "Reconnect attempts exhausted, offline until reconnect()"
                );
                self.router.connection_lost();
                self.publish(ConnectionState::Disconnected);
                if self.park().await {
                    failures = 0;
                    auth_failures = 0;
                    continue;
                }
                break;
            }

            let delay = delay_for(failures - 1, &self.options.client);
            debug!(
                attempt = failures,
                delay_ms = delay.as_millis() as u64,
                "Scheduling stream reconnect"
            );
            match self.wait(delay).await {
                Wait::Cancelled => break,
                Wait::Reconnect => {
                    failures = 0;
                    auth_failures = 0;
                }
                Wait::Elapsed => {}
            }
        }

        self.publish(ConnectionState::Idle);
    }

    async fn open_stream(&mut self) -> Open {
        let url = format!("{}/api/notifications/stream", self.options.base_url);
        let request = self
            .http
            .get(&url)
            .query(&[("connection_id", self.connection_id.to_string())])
            .bearer_auth(&self.options.token);

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return Open::Cancelled,
            result = request.send() => result,
        };

        match result {
            Ok(response) if response.status().is_success() => Open::Opened(response),
            Ok(response)
                if response.status() == reqwest::StatusCode::UNAUTHORIZED
                    || response.status() == reqwest::StatusCode::FORBIDDEN =>
            {
                Open::AuthRejected(response.status())
            }
            Ok(response) => {
                warn!(status = %response.status(), "Stream open rejected");
                Open::Failed
            }
            Err(e) => {
                warn!(error = %e, "Stream connection failed");
                Open::Failed
            }
        }
    }

    async fn consume(&mut self, response: reqwest::Response) -> StreamEnd {
        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        // Until the ack reports the heartbeat cadence, the connect
        // timeout bounds the wait for the first frame.
        self.stall = Duration::from_secs(self.options.client.connect_timeout_seconds.max(1));
        let mut last_activity = Instant::now();

        loop {
            let read = tokio::select! {
                _ = self.cancel.cancelled() => return StreamEnd::Cancelled,
                cmd = self.commands.recv() => {
                    return match cmd {
                        Some(Command::Reconnect) => StreamEnd::Reconnect,
                        None => StreamEnd::Cancelled,
                    };
                }
                read = tokio::time::timeout(self.stall, stream.next()) => read,
            };

            match read {
                Err(_) => {
                    warn!(
                        idle_ms = last_activity.elapsed().as_millis() as u64,
                        "No stream traffic within the stall window, dropping connection"
                    );
                    return StreamEnd::Faulted;
                }
                Ok(None) => {
                    debug!("Stream closed by server");
                    return StreamEnd::Closed;
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "Stream transport error");
                    return StreamEnd::Faulted;
                }
                Ok(Some(Ok(chunk))) => {
                    last_activity = Instant::now();
                    for frame in decoder.push(&chunk) {
                        self.handle_frame(&frame.data);
                    }
                }
            }
        }
    }

    fn handle_frame(&mut self, data: &str) {
        match serde_json::from_str::<StreamMessage>(data) {
            Ok(StreamMessage::Connected(ack)) => {
                debug!(
                    connection_id = %ack.connection_id,
                    heartbeat_seconds = ack.heartbeat_interval_seconds,
                    "Stream established"
                );
                // Two missed heartbeats mean the connection is dead.
                self.stall = Duration::from_secs(ack.heartbeat_interval_seconds.max(1) * 2);
            }
            Ok(StreamMessage::InitialNotifications(items)) => {
                debug!(count = items.len(), "Snapshot received");
                self.lock_feed().replace_all(items);
            }
            Ok(StreamMessage::Notification(notification)) => {
                let fresh = self.lock_feed().insert(notification.clone());
                if fresh {
                    self.router.route(&notification);
                }
            }
            Ok(StreamMessage::Heartbeat) => {
                trace!("Heartbeat");
            }
            Err(e) => {
                warn!(error = %e, raw = data, "Malformed stream message, skipping");
            }
        }
    }

    async fn wait(&mut self, delay: Duration) -> Wait {
        tokio::select! {
            _ = self.cancel.cancelled() => Wait::Cancelled,
            _ = tokio::time::sleep(delay) => Wait::Elapsed,
            cmd = self.commands.recv() => match cmd {
                Some(Command::Reconnect) => Wait::Reconnect,
                None => Wait::Cancelled,
            },
        }
    }

    /// Park in Disconnected until `reconnect()` or teardown.
    async fn park(&mut self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            cmd = self.commands.recv() => matches!(cmd, Some(Command::Reconnect)),
        }
    }

    fn lock_feed(&self) -> MutexGuard<'_, NotificationFeed> {
        self.feed.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: ConnectionState) {
        let _ = self.state_tx.send(state);
    }
}
