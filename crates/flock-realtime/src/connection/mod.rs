//! Stream connection primitives.

pub mod handle;
pub mod pool;
