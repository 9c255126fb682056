//! Integration tests for the notification consumer against a live
//! server.

use std::time::Duration;

use tokio::time::timeout;

use flock_client::{ConnectionState, NotificationConsumer, SurfaceVisibility};
use flock_core::types::Role;
use flock_notify::model::Priority;

use crate::helpers::{
    ADMIN_TOKEN, MEMBER_TOKEN, TestApp, consumer_options, spawn_server, wait_until,
};

async fn wait_for_state(consumer: &NotificationConsumer, want: ConnectionState) {
    let mut states = consumer.state_changes();
    timeout(Duration::from_secs(5), states.wait_for(|s| *s == want))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {want:?}"))
        .expect("consumer task dropped its state channel");
}

#[tokio::test]
async fn test_consumer_ingests_snapshot_then_live_traffic() {
    let app = TestApp::new();
    app.state
        .sender
        .system_alert("Before connect", "In the snapshot", Priority::Medium);
    let base_url = spawn_server(&app).await;

    let (options, _system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;
    wait_until("the snapshot to land", || consumer.notifications().len() == 1).await;

    let live = app
        .state
        .sender
        .system_alert("Live", "Pushed mid-stream", Priority::High);
    wait_until("the live notification", || {
        consumer.notifications().len() == 2
    })
    .await;

    let feed = consumer.notifications();
    assert_eq!(feed[0].id, live.id, "high priority sorts first");
    assert_eq!(consumer.unread_count(), 2);
    // Only the live high-priority notification alerts; snapshot items
    // never do.
    assert_eq!(toasts.shown(), 1);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_delivery_neither_duplicates_nor_realerts() {
    let app = TestApp::new();
    let base_url = spawn_server(&app).await;

    let (options, _system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;

    let n = app
        .state
        .sender
        .system_alert("Once", "Alert-worthy", Priority::Urgent);
    wait_until("the notification", || consumer.notifications().len() == 1).await;

    // Redeliver the same notification through the publisher slot.
    app.state.broadcaster.broadcast(&n);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(consumer.notifications().len(), 1);
    assert_eq!(toasts.shown(), 1);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_mark_read_is_acknowledged_to_the_server() {
    let app = TestApp::new();
    let published = app
        .state
        .sender
        .system_alert("Ack me", "Needs a read receipt", Priority::Medium);
    let base_url = spawn_server(&app).await;

    let (options, _system, _toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;
    wait_until("the snapshot to land", || consumer.notifications().len() == 1).await;

    assert!(consumer.mark_read(published.id));
    assert_eq!(consumer.unread_count(), 0, "local flip is immediate");
    assert!(!consumer.mark_read(published.id), "second flip is a no-op");

    // The acknowledgement travels on a detached task; poll the server.
    let identity = app.identity(Role::Member);
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        let unread = app
            .state
            .engine
            .unread_count(&identity)
            .await
            .expect("unread count");
        if unread == 0 {
            break;
        }
        if std::time::Instant::now() > deadline {
            panic!("server never saw the read mark");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_mark_all_read_flips_everything() {
    let app = TestApp::new();
    app.state
        .sender
        .system_alert("One", "First", Priority::Medium);
    app.state
        .sender
        .system_alert("Two", "Second", Priority::Medium);
    let base_url = spawn_server(&app).await;

    let (options, _system, _toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;
    wait_until("the snapshot to land", || consumer.notifications().len() == 2).await;

    assert_eq!(consumer.mark_all_read(), 2);
    assert_eq!(consumer.unread_count(), 0);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_hidden_surface_routes_urgent_alerts_to_system() {
    let app = TestApp::new();
    let base_url = spawn_server(&app).await;

    let (options, system, toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    options.surface.set(SurfaceVisibility::Hidden);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;

    app.state
        .sender
        .system_alert("Urgent", "While hidden", Priority::Urgent);
    wait_until("the notification", || consumer.notifications().len() == 1).await;

    assert_eq!(system.delivered(), 1);
    assert_eq!(toasts.shown(), 0);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_admin_consumer_alerts_on_admin_traffic() {
    let app = TestApp::new();
    let base_url = spawn_server(&app).await;

    let (options, _system, toasts) = consumer_options(&base_url, ADMIN_TOKEN, Role::Admin);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;

    // Medium priority, but admin-audience traffic always alerts admins.
    app.state.sender.prayer_request("Jordan Lee", false);
    wait_until("the prayer request", || consumer.notifications().len() == 1).await;

    assert_eq!(toasts.shown(), 1);

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_local_remove_survives_until_next_snapshot() {
    let app = TestApp::new();
    let published = app
        .state
        .sender
        .system_alert("Dismiss me", "Locally", Priority::Medium);
    let base_url = spawn_server(&app).await;

    let (options, _system, _toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;
    wait_until("the snapshot to land", || consumer.notifications().len() == 1).await;

    assert!(consumer.remove(published.id));
    assert!(consumer.notifications().is_empty());
    assert_eq!(consumer.unread_count(), 0);

    // The server was never told; a reconnect snapshot restores it.
    consumer.reconnect();
    wait_until("the restoring snapshot", || {
        consumer.notifications().len() == 1
    })
    .await;

    consumer.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_parks_the_state_at_idle() {
    let app = TestApp::new();
    let base_url = spawn_server(&app).await;

    let (options, _system, _toasts) = consumer_options(&base_url, MEMBER_TOKEN, Role::Member);
    let consumer = NotificationConsumer::spawn(options).expect("spawn consumer");
    wait_for_state(&consumer, ConnectionState::Connected).await;

    let states = consumer.state_changes();
    consumer.shutdown().await;
    assert_eq!(*states.borrow(), ConnectionState::Idle);
}
