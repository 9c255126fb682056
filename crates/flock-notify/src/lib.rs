//! # flock-notify
//!
//! Notification domain for Gracepoint Flock: the model and its display
//! ordering, the factory that builds notifications for each business
//! event, the stream wire protocol, and the broadcaster that hands
//! freshly created notifications to whatever delivery backend is
//! registered at runtime.

pub mod broadcast;
pub mod factory;
pub mod model;
pub mod sender;
pub mod wire;

pub use broadcast::{Broadcaster, NotificationPublisher};
pub use factory::{NotificationFactory, NotificationInput};
pub use model::{Audience, Notification, NotificationKind, NotificationMetadata, Priority};
pub use sender::NotificationSender;
pub use wire::{ConnectionAck, ControlRequest, StreamMessage};
