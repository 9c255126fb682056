//! Core traits defined in `flock-core` and implemented by other crates.

pub mod read_store;
pub mod session;

pub use read_store::ReadStateStore;
pub use session::{SessionIdentity, SessionVerifier};
