//! # flock-client
//!
//! Stream consumer for Gracepoint Flock: an incremental SSE frame
//! decoder, the local notification feed (ordered list + unread count),
//! a single owning connection task with capped exponential-backoff
//! reconnection, optimistic read acknowledgements, and the alert router
//! that decides between system notifications and in-app toasts.

pub mod alerts;
pub mod backoff;
pub mod consumer;
pub mod control;
pub mod feed;
pub mod sse;

pub use alerts::{AlertRouter, SurfaceFlag, SurfaceVisibility, SystemNotifier, ToastSink};
pub use consumer::{ConnectionState, ConsumerOptions, NotificationConsumer};
pub use control::ControlClient;
pub use feed::NotificationFeed;
pub use sse::{SseDecoder, SseFrame};
