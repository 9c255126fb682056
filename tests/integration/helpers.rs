//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use flock_api::{AppState, build_router, build_state};
use flock_client::{ConsumerOptions, SurfaceFlag, SystemNotifier, ToastSink};
use flock_core::config::AppConfig;
use flock_core::config::auth::SessionTokenEntry;
use flock_core::traits::SessionIdentity;
use flock_core::types::{Role, UserId};
use flock_notify::model::Notification;

pub const MEMBER_TOKEN: &str = "member-token";
pub const ADMIN_TOKEN: &str = "admin-token";

/// Test application context with one seeded member and one seeded admin
/// session.
pub struct TestApp {
    /// The Axum router for making oneshot requests
    pub router: Router,
    /// Shared state, for direct engine and broadcaster access
    pub state: AppState,
    /// The seeded member identity
    pub member_id: UserId,
    /// The seeded admin identity
    pub admin_id: UserId,
}

impl TestApp {
    /// Create a test application with default configuration.
    pub fn new() -> Self {
        Self::customized(|_| {})
    }

    /// Create a test application after adjusting the configuration.
    pub fn customized(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let member_id = UserId::new();
        let admin_id = UserId::new();

        let mut config = AppConfig::default();
        config.auth.tokens = vec![
            SessionTokenEntry {
                token: MEMBER_TOKEN.to_string(),
                user_id: member_id,
                display_name: "Priya Member".to_string(),
                role: Role::Member,
            },
            SessionTokenEntry {
                token: ADMIN_TOKEN.to_string(),
                user_id: admin_id,
                display_name: "Pastor Kim".to_string(),
                role: Role::Admin,
            },
        ];
        adjust(&mut config);

        let state = build_state(config);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            member_id,
            admin_id,
        }
    }

    /// The seeded session identity for a role, as the session extractor
    /// would build it.
    pub fn identity(&self, role: Role) -> SessionIdentity {
        match role {
            Role::Admin => SessionIdentity {
                user_id: self.admin_id,
                display_name: "Pastor Kim".to_string(),
                role,
            },
            Role::Member => SessionIdentity {
                user_id: self.member_id,
                display_name: "Priya Member".to_string(),
                role,
            },
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Serve the app on an ephemeral loopback port and return its base URL.
///
/// The server task runs until the test process exits.
pub async fn spawn_server(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });
    format!("http://{addr}")
}

/// A server that accepts TCP connections and hangs up immediately,
/// counting each accept. Every connection through it is a transport
/// failure.
pub async fn spawn_hangup_server() -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind hangup listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let accepts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepts);
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });
    (format!("http://{addr}"), accepts)
}

/// Poll a condition until it holds, panicking after five seconds.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// System notification sink that records deliveries.
#[derive(Debug)]
pub struct RecordingNotifier {
    granted: bool,
    delivered: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new(granted: bool) -> Arc<Self> {
        Arc::new(Self {
            granted,
            delivered: AtomicUsize::new(0),
        })
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

impl SystemNotifier for RecordingNotifier {
    fn permission(&self) -> bool {
        self.granted
    }

    fn notify(&self, _notification: &Notification) {
        self.delivered.fetch_add(1, Ordering::SeqCst);
    }
}

/// Toast sink that records alerts and offline notices.
#[derive(Debug, Default)]
pub struct RecordingToasts {
    shown: AtomicUsize,
    lost: AtomicUsize,
}

impl RecordingToasts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    pub fn lost(&self) -> usize {
        self.lost.load(Ordering::SeqCst)
    }
}

impl ToastSink for RecordingToasts {
    fn notify(&self, _notification: &Notification) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn connection_lost(&self) {
        self.lost.fetch_add(1, Ordering::SeqCst);
    }
}

/// Consumer options pointed at a test server, with recording sinks and
/// test-speed backoff delays.
pub fn consumer_options(
    base_url: &str,
    token: &str,
    role: Role,
) -> (ConsumerOptions, Arc<RecordingNotifier>, Arc<RecordingToasts>) {
    let system = RecordingNotifier::new(true);
    let toasts = RecordingToasts::new();

    let mut client = flock_core::config::client::ClientConfig::default();
    client.base_delay_ms = 25;
    client.max_delay_ms = 100;
    client.connect_timeout_seconds = 2;

    let options = ConsumerOptions {
        base_url: base_url.to_string(),
        token: token.to_string(),
        viewer_role: role,
        client,
        surface: SurfaceFlag::default(),
        system: system.clone(),
        toasts: toasts.clone(),
    };
    (options, system, toasts)
}
