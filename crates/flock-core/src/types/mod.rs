//! Shared typed identifiers and role types.

pub mod id;
pub mod role;

pub use id::{ConnectionId, NotificationId, UserId};
pub use role::Role;
