//! Core types and storage access for the clinic record service.
//!
//! This crate is deliberately free of HTTP and Redis dependencies. Storage
//! backends implement [`store::KvStore`]; every component above it is generic
//! over that trait and receives its store handle at construction.

// Native `async fn` in traits; the `Send` bounds are spelled out on the trait.
#![allow(async_fn_in_trait)]

pub mod allocator;
pub mod analytics;
pub mod bootstrap;
pub mod entity;
pub mod error;
pub mod integrity;
pub mod memory;
pub mod params;
pub mod registry;
pub mod relationship;
pub mod repository;
pub mod store;

mod keys;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use params::Params;
pub use registry::Registry;
pub use store::{Fields, KvStore};
