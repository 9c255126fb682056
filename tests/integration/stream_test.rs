//! Integration tests for the SSE notification stream endpoint.
//!
//! These drive the full HTTP stack via oneshot requests and read the
//! streaming response body incrementally, decoding it with the client
//! crate's SSE decoder.

use std::collections::VecDeque;
use std::time::Duration;

use axum::body::{Body, BodyDataStream};
use axum::http::{Request, StatusCode, header};
use futures::StreamExt;
use tokio::time::timeout;
use tower::ServiceExt;

use flock_client::{SseDecoder, SseFrame};
use flock_core::types::{ConnectionId, Role};
use flock_notify::model::Priority;
use flock_notify::wire::StreamMessage;

use crate::helpers::{ADMIN_TOKEN, MEMBER_TOKEN, TestApp};

/// Reads protocol messages off a live SSE response body.
struct StreamReader {
    body: BodyDataStream,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
}

impl StreamReader {
    /// Open the stream endpoint and assert the SSE response headers.
    async fn open(app: &TestApp, token: &str, query: &str) -> Self {
        let request = Request::builder()
            .method("GET")
            .uri(format!("/api/notifications/stream{query}"))
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build request");

        let response = app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            content_type.starts_with("text/event-stream"),
            "unexpected content type: {content_type}"
        );

        Self {
            body: response.into_body().into_data_stream(),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }
    }

    /// Next protocol message, waiting up to five seconds.
    async fn next_message(&mut self) -> StreamMessage {
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return serde_json::from_str(&frame.data).expect("valid stream message");
            }
            let chunk = timeout(Duration::from_secs(5), self.body.next())
                .await
                .expect("timed out waiting for a stream chunk")
                .expect("stream ended unexpectedly")
                .expect("stream body error");
            self.pending.extend(self.decoder.push(&chunk));
        }
    }

    /// Read the handshake pair and return the snapshot it carried.
    async fn handshake(&mut self) -> Vec<flock_notify::model::Notification> {
        match self.next_message().await {
            StreamMessage::Connected(_) => {}
            other => panic!("expected connected first, got {other:?}"),
        }
        match self.next_message().await {
            StreamMessage::InitialNotifications(items) => items,
            other => panic!("expected initial_notifications second, got {other:?}"),
        }
    }

    /// Wait for the server to end the stream.
    async fn wait_for_close(&mut self, within: Duration) {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .unwrap_or_default();
            match timeout(remaining, self.body.next()).await {
                Ok(None) => return,
                Ok(Some(Ok(chunk))) => {
                    // Late heartbeats before the deadline are fine.
                    self.pending.extend(self.decoder.push(&chunk));
                }
                Ok(Some(Err(e))) => panic!("stream body error: {e}"),
                Err(_) => panic!("stream did not close within {within:?}"),
            }
        }
    }
}

#[tokio::test]
async fn test_stream_rejects_anonymous_callers() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/notifications/stream", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_handshake_precedes_everything_and_echoes_connection_id() {
    let app = TestApp::new();
    app.state
        .sender
        .system_alert("Existing", "Published before connect", Priority::Medium);

    let conn_id = ConnectionId::new();
    let mut stream =
        StreamReader::open(&app, MEMBER_TOKEN, &format!("?connection_id={conn_id}")).await;

    match stream.next_message().await {
        StreamMessage::Connected(ack) => {
            assert_eq!(ack.connection_id, conn_id);
            assert_eq!(
                ack.heartbeat_interval_seconds,
                app.state.config.stream.heartbeat_interval_seconds
            );
        }
        other => panic!("expected connected first, got {other:?}"),
    }
    match stream.next_message().await {
        StreamMessage::InitialNotifications(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].title, "Existing");
        }
        other => panic!("expected initial_notifications second, got {other:?}"),
    }
}

#[tokio::test]
async fn test_live_notification_reaches_open_stream() {
    let app = TestApp::new();
    let mut stream = StreamReader::open(&app, MEMBER_TOKEN, "").await;
    let snapshot = stream.handshake().await;
    assert!(snapshot.is_empty());

    let published = app
        .state
        .sender
        .system_alert("Water main", "Shut off at 3pm", Priority::High);

    match stream.next_message().await {
        StreamMessage::Notification(n) => {
            assert_eq!(n.id, published.id);
            assert_eq!(n.priority, Priority::High);
        }
        other => panic!("expected a live notification, got {other:?}"),
    }
}

#[tokio::test]
async fn test_admin_traffic_skips_member_streams() {
    let app = TestApp::new();
    let mut member = StreamReader::open(&app, MEMBER_TOKEN, "").await;
    let mut admin = StreamReader::open(&app, ADMIN_TOKEN, "").await;
    member.handshake().await;
    admin.handshake().await;

    // Admin-only, then broadcast. Frames are delivered in publish order,
    // so the member seeing the broadcast first proves the admin-only
    // notification was never queued for them.
    let admin_only = app.state.sender.prayer_request("Jordan Lee", false);
    let broadcast = app
        .state
        .sender
        .system_alert("Potluck", "Sign-up open", Priority::Medium);

    match admin.next_message().await {
        StreamMessage::Notification(n) => assert_eq!(n.id, admin_only.id),
        other => panic!("expected the prayer request, got {other:?}"),
    }
    match member.next_message().await {
        StreamMessage::Notification(n) => assert_eq!(n.id, broadcast.id),
        other => panic!("expected the broadcast, got {other:?}"),
    }
}

#[tokio::test]
async fn test_heartbeats_arrive_as_protocol_messages() {
    let app = TestApp::customized(|config| {
        config.stream.heartbeat_interval_seconds = 1;
    });
    let mut stream = StreamReader::open(&app, MEMBER_TOKEN, "").await;
    stream.handshake().await;

    match stream.next_message().await {
        StreamMessage::Heartbeat => {}
        other => panic!("expected a heartbeat, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_closes_at_max_lifetime() {
    let app = TestApp::customized(|config| {
        config.stream.max_connection_lifetime_seconds = 1;
        config.stream.heartbeat_interval_seconds = 1;
    });
    let mut stream = StreamReader::open(&app, MEMBER_TOKEN, "").await;
    stream.handshake().await;

    stream.wait_for_close(Duration::from_secs(5)).await;
    assert_eq!(app.state.engine.connection_count(), 0);
}

#[tokio::test]
async fn test_snapshot_projects_read_state() {
    let app = TestApp::new();
    let published = app
        .state
        .sender
        .system_alert("Read me", "Before connecting", Priority::Medium);
    app.state
        .engine
        .mark_read(&app.identity(Role::Member), published.id)
        .await
        .expect("mark read");

    let mut stream = StreamReader::open(&app, MEMBER_TOKEN, "").await;
    let snapshot = stream.handshake().await;

    assert_eq!(snapshot.len(), 1);
    assert!(snapshot[0].read);
}
