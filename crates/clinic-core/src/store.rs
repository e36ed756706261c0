//! The `KvStore` trait — the storage capability every component is built on.
//!
//! The trait is implemented by storage backends (`clinic-store-redis`, and
//! [`crate::memory::MemoryStore`] for tests). Each method maps onto a single
//! store operation and is atomic in isolation; nothing here spans more than one
//! operation.

use std::{
  collections::{BTreeMap, BTreeSet},
  future::Future,
};

/// Field name → value mapping of one stored record.
pub type Fields = BTreeMap<String, String>;

/// Abstraction over a string-keyed key-value store with hash-map and set
/// values.
///
/// All methods return `Send` futures so the trait can be used behind `axum`
/// on a multi-threaded runtime.
pub trait KvStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Plain values ──────────────────────────────────────────────────────

  /// Read a plain string value. `None` if the key does not exist.
  fn get(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

  /// Write a plain string value, replacing whatever the key held.
  fn set(
    &self,
    key: &str,
    value: &str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Increment the integer at `key` by one and return the new value.
  /// A missing key counts as `0`.
  fn incr(&self, key: &str) -> impl Future<Output = Result<i64, Self::Error>> + Send;

  fn exists(&self, key: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  // ── Hash maps ─────────────────────────────────────────────────────────

  /// Read every field of the hash at `key`; empty if the key does not exist.
  fn hash_get_all(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Fields, Self::Error>> + Send;

  /// Replace the hash at `key` so that it holds exactly `fields`. Fields not
  /// present in `fields` are dropped; an empty map removes the key.
  fn hash_replace(
    &self,
    key: &str,
    fields: &Fields,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  // ── Sets ──────────────────────────────────────────────────────────────

  /// Add `member` to the set at `key`. Returns `false` if it was already
  /// present.
  fn set_add(
    &self,
    key: &str,
    member: &str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  /// All members of the set at `key`; empty if the key does not exist.
  fn set_members(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<BTreeSet<String>, Self::Error>> + Send;
}
