//! Integration tests for consumer reconnection behavior.

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::time::timeout;

use flock_client::{ConnectionState, NotificationConsumer};
use flock_core::types::Role;

use crate::helpers::{
    MEMBER_TOKEN, TestApp, consumer_options, spawn_hangup_server, spawn_server,
};

async fn wait_for_state(consumer: &NotificationConsumer, want: ConnectionState) {
    let mut states = consumer.state_changes();
    timeout(Duration::from_secs(5), states.wait_for(|s| *s == want))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {want:?}"))
        .expect("consumer task dropped its state channel");
}

#[tokio::test]
async fn test_gives_up_after_exactly_three_transport_failures() {
    let (base_url, accepts) = spawn_hangup_server().await;

    let (options, _system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");

    wait_for_state(&consumer, ConnectionState::Disconnected).await;

    assert_eq!(accepts.load(Ordering::SeqCst), 3, "one accept per attempt");
    assert_eq!(toasts.lost(), 1, "offline notice shown exactly once");

    // Parked: no further attempts without an explicit reconnect.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 3);
    assert_eq!(consumer.state(), ConnectionState::Disconnected);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_reconnect_revives_a_parked_consumer() {
    // Reserve a port, then leave it closed so every attempt is refused.
    let placeholder = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("reserve a port");
    let addr = placeholder.local_addr().expect("local addr");
    drop(placeholder);
    let base_url = format!("http://{addr}");

    let (options, _system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Disconnected).await;
    assert_eq!(toasts.lost(), 1);

    // Bring a real server up on the reserved port, then ask for a
    // fresh connection.
    let app = TestApp::new();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("rebind the reserved port");
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    consumer.reconnect();
    wait_for_state(&consumer, ConnectionState::Connected).await;

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_server_side_close_reconnects_automatically() {
    let app = TestApp::customized(|config| {
        config.stream.max_connection_lifetime_seconds = 1;
        config.stream.heartbeat_interval_seconds = 1;
    });
    let base_url = spawn_server(&app).await;

    let (options, _system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;

    // The server closes the stream at the lifetime deadline; the
    // consumer must come back on its own, reusing its connection id.
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    loop {
        let opened = app.state.engine.metrics_snapshot().connections_opened;
        if opened >= 2 {
            break;
        }
        if std::time::Instant::now() > deadline {
            panic!("consumer never reconnected after the server-side close");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    wait_for_state(&consumer, ConnectionState::Connected).await;
    assert_eq!(toasts.lost(), 0, "a lifetime close is not a lost connection");
    assert_eq!(app.state.engine.connection_count(), 1);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_reconnect_resets_the_failure_budget() {
    let (base_url, accepts) = spawn_hangup_server().await;

    let (options, _system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Disconnected).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 3);

    // A fresh request buys three more attempts against the same dead
    // server, and a second offline notice when they run out.
    consumer.reconnect();
    wait_for_state(&consumer, ConnectionState::Connecting).await;
    wait_for_state(&consumer, ConnectionState::Disconnected).await;

    assert_eq!(accepts.load(Ordering::SeqCst), 6);
    assert_eq!(toasts.lost(), 2);

    consumer.shutdown().await;
}
