//! Redis backend for the clinic record service.
//!
//! Wraps a [`redis::aio::ConnectionManager`], which reconnects on its own after
//! a dropped connection; a request issued while the server is down fails and
//! is reported to the caller rather than retried.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::RedisStore;
