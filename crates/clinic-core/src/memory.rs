//! In-process [`KvStore`] for tests and `--in-memory` development runs.
//!
//! Mirrors the value model of a Redis server: a key holds a plain string, a
//! hash, or a set, and operating on a key of the wrong type is an error.

use std::{
  collections::{BTreeSet, HashMap},
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::store::{Fields, KvStore};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("operation against key {0:?} holding the wrong kind of value")]
  WrongType(String),

  #[error("value at {0:?} is not an integer")]
  NotAnInteger(String),

  #[error("store is offline")]
  Offline,
}

#[derive(Debug, Clone)]
enum Value {
  Plain(String),
  Hash(Fields),
  Set(BTreeSet<String>),
}

/// A key-value store held entirely in memory.
///
/// Cloning is cheap; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  data:    Arc<RwLock<HashMap<String, Value>>>,
  offline: Arc<AtomicBool>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make every subsequent operation fail with [`MemoryError::Offline`] until
  /// switched back. Used to exercise connection-failure paths.
  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  fn check_online(&self) -> Result<(), MemoryError> {
    if self.offline.load(Ordering::SeqCst) {
      Err(MemoryError::Offline)
    } else {
      Ok(())
    }
  }
}

impl KvStore for MemoryStore {
  type Error = MemoryError;

  async fn get(&self, key: &str) -> Result<Option<String>, MemoryError> {
    self.check_online()?;
    match self.data.read().await.get(key) {
      None => Ok(None),
      Some(Value::Plain(v)) => Ok(Some(v.clone())),
      Some(_) => Err(MemoryError::WrongType(key.to_owned())),
    }
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), MemoryError> {
    self.check_online()?;
    self
      .data
      .write()
      .await
      .insert(key.to_owned(), Value::Plain(value.to_owned()));
    Ok(())
  }

  async fn incr(&self, key: &str) -> Result<i64, MemoryError> {
    self.check_online()?;
    let mut data = self.data.write().await;
    let current = match data.get(key) {
      None => 0,
      Some(Value::Plain(v)) => v
        .parse::<i64>()
        .map_err(|_| MemoryError::NotAnInteger(key.to_owned()))?,
      Some(_) => return Err(MemoryError::WrongType(key.to_owned())),
    };
    let next = current
      .checked_add(1)
      .ok_or_else(|| MemoryError::NotAnInteger(key.to_owned()))?;
    data.insert(key.to_owned(), Value::Plain(next.to_string()));
    Ok(next)
  }

  async fn exists(&self, key: &str) -> Result<bool, MemoryError> {
    self.check_online()?;
    Ok(self.data.read().await.contains_key(key))
  }

  async fn hash_get_all(&self, key: &str) -> Result<Fields, MemoryError> {
    self.check_online()?;
    match self.data.read().await.get(key) {
      None => Ok(Fields::new()),
      Some(Value::Hash(h)) => Ok(h.clone()),
      Some(_) => Err(MemoryError::WrongType(key.to_owned())),
    }
  }

  async fn hash_replace(&self, key: &str, fields: &Fields) -> Result<(), MemoryError> {
    self.check_online()?;
    let mut data = self.data.write().await;
    if fields.is_empty() {
      data.remove(key);
    } else {
      data.insert(key.to_owned(), Value::Hash(fields.clone()));
    }
    Ok(())
  }

  async fn set_add(&self, key: &str, member: &str) -> Result<bool, MemoryError> {
    self.check_online()?;
    let mut data = self.data.write().await;
    let entry = data
      .entry(key.to_owned())
      .or_insert_with(|| Value::Set(BTreeSet::new()));
    match entry {
      Value::Set(s) => Ok(s.insert(member.to_owned())),
      _ => Err(MemoryError::WrongType(key.to_owned())),
    }
  }

  async fn set_members(&self, key: &str) -> Result<BTreeSet<String>, MemoryError> {
    self.check_online()?;
    match self.data.read().await.get(key) {
      None => Ok(BTreeSet::new()),
      Some(Value::Set(s)) => Ok(s.clone()),
      Some(_) => Err(MemoryError::WrongType(key.to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn incr_starts_from_zero() {
    let s = MemoryStore::new();
    assert_eq!(s.incr("n").await.unwrap(), 1);
    assert_eq!(s.incr("n").await.unwrap(), 2);
    assert_eq!(s.get("n").await.unwrap().as_deref(), Some("2"));
  }

  #[tokio::test]
  async fn incr_rejects_non_integer() {
    let s = MemoryStore::new();
    s.set("n", "abc").await.unwrap();
    assert!(matches!(s.incr("n").await, Err(MemoryError::NotAnInteger(_))));
  }

  #[tokio::test]
  async fn hash_replace_drops_old_fields() {
    let s = MemoryStore::new();
    let mut first = Fields::new();
    first.insert("a".into(), "1".into());
    first.insert("b".into(), "2".into());
    s.hash_replace("h", &first).await.unwrap();

    let mut second = Fields::new();
    second.insert("c".into(), "3".into());
    s.hash_replace("h", &second).await.unwrap();

    assert_eq!(s.hash_get_all("h").await.unwrap(), second);
  }

  #[tokio::test]
  async fn wrong_type_is_an_error() {
    let s = MemoryStore::new();
    s.set_add("k", "1").await.unwrap();
    assert!(matches!(s.get("k").await, Err(MemoryError::WrongType(_))));
    assert!(matches!(s.hash_get_all("k").await, Err(MemoryError::WrongType(_))));
  }

  #[tokio::test]
  async fn offline_fails_every_operation() {
    let s = MemoryStore::new();
    s.set_offline(true);
    assert!(matches!(s.get("k").await, Err(MemoryError::Offline)));
    assert!(matches!(s.set_members("k").await, Err(MemoryError::Offline)));
    s.set_offline(false);
    assert!(s.get("k").await.unwrap().is_none());
  }
}
