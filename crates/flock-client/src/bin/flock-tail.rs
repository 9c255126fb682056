//! Terminal watcher for the Flock notification stream.
//!
//! Connects as a regular consumer, prints every notification the
//! session can see, and shows connection state transitions. Alerts
//! route to stdout as toasts.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flock_client::{
    ConsumerOptions, NotificationConsumer, SurfaceFlag, SurfaceVisibility, SystemNotifier,
    ToastSink,
};
use flock_core::config::client::ClientConfig;
use flock_core::types::{NotificationId, Role};
use flock_notify::model::Notification;

#[derive(Debug, Parser)]
#[command(
    name = "flock-tail",
    about = "Tail the Flock notification stream from a terminal"
)]
struct Args {
    /// Server base URL.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// Bearer token for the session.
    #[arg(long)]
    token: String,

    /// Role the token grants; drives alert routing.
    #[arg(long, default_value = "member")]
    role: Role,
}

/// Toasts print inline with the feed.
#[derive(Debug)]
struct StdoutToasts;

impl ToastSink for StdoutToasts {
    fn notify(&self, notification: &Notification) {
        println!(
            "!! alert [{}] {}: {}",
            notification.priority, notification.title, notification.message
        );
    }

    fn connection_lost(&self) {
        println!("!! connection lost, press Ctrl+C to exit or restart the server to resume");
    }
}

/// Terminals have no OS notification surface.
#[derive(Debug)]
struct NoSystemNotifications;

impl SystemNotifier for NoSystemNotifications {
    fn permission(&self) -> bool {
        false
    }

    fn notify(&self, _notification: &Notification) {}
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let options = ConsumerOptions {
        base_url: args.url,
        token: args.token,
        viewer_role: args.role,
        client: ClientConfig::default(),
        surface: SurfaceFlag::new(SurfaceVisibility::Visible),
        system: Arc::new(NoSystemNotifications),
        toasts: Arc::new(StdoutToasts),
    };

    let consumer = match NotificationConsumer::spawn(options) {
        Ok(consumer) => consumer,
        Err(e) => {
            eprintln!("Failed to start consumer: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut states = consumer.state_changes();
    let mut seen: HashSet<NotificationId> = HashSet::new();
    let mut poll = tokio::time::interval(Duration::from_secs(1));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("-- state: {:?}", *states.borrow());
            }
            _ = poll.tick() => {
                for notification in consumer.notifications() {
                    if seen.insert(notification.id) {
                        print_notification(&notification);
                    }
                }
            }
        }
    }

    consumer.shutdown().await;
    println!("-- closed");
    std::process::ExitCode::SUCCESS
}

fn print_notification(notification: &Notification) {
    let marker = if notification.read { ' ' } else { '*' };
    println!(
        "{} {} [{}] {}: {}",
        notification.created_at.format("%H:%M:%S"),
        marker,
        notification.kind,
        notification.title,
        notification.message
    );
}
