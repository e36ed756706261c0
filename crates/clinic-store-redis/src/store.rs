//! [`RedisStore`] — the Redis implementation of [`KvStore`].

use std::collections::BTreeSet;

use clinic_core::store::{Fields, KvStore};
use redis::{AsyncCommands as _, aio::ConnectionManager};
use tracing::info;

use crate::{Error, Result};

/// A key-value store backed by a single Redis server.
///
/// Cloning is cheap — the connection manager is a shared multiplexed handle.
#[derive(Clone)]
pub struct RedisStore {
  pub(crate) conn: ConnectionManager,
}

impl RedisStore {
  /// Connect to `url` (e.g. `redis://localhost:6379/0`).
  pub async fn connect(url: &str) -> Result<Self> {
    let client = redis::Client::open(url)?;
    let conn = ConnectionManager::new(client).await?;
    info!(%url, "connected to redis");
    Ok(Self { conn })
  }
}

impl KvStore for RedisStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let mut conn = self.conn.clone();
    Ok(conn.get(key).await?)
  }

  async fn set(&self, key: &str, value: &str) -> Result<()> {
    let mut conn = self.conn.clone();
    let _: () = conn.set(key, value).await?;
    Ok(())
  }

  async fn incr(&self, key: &str) -> Result<i64> {
    let mut conn = self.conn.clone();
    Ok(conn.incr(key, 1i64).await?)
  }

  async fn exists(&self, key: &str) -> Result<bool> {
    let mut conn = self.conn.clone();
    Ok(conn.exists(key).await?)
  }

  async fn hash_get_all(&self, key: &str) -> Result<Fields> {
    let mut conn = self.conn.clone();
    Ok(conn.hgetall(key).await?)
  }

  async fn hash_replace(&self, key: &str, fields: &Fields) -> Result<()> {
    let pairs: Vec<(&str, &str)> = fields
      .iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
      .collect();

    // DEL + HSET in one MULTI/EXEC so readers never see a half-written hash.
    let mut pipe = redis::pipe();
    pipe.atomic().del(key).ignore();
    if !pairs.is_empty() {
      pipe.hset_multiple(key, &pairs).ignore();
    }

    let mut conn = self.conn.clone();
    let _: () = pipe.query_async(&mut conn).await?;
    Ok(())
  }

  async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
    let mut conn = self.conn.clone();
    let added: i64 = conn.sadd(key, member).await?;
    Ok(added > 0)
  }

  async fn set_members(&self, key: &str) -> Result<BTreeSet<String>> {
    let mut conn = self.conn.clone();
    Ok(conn.smembers(key).await?)
  }
}
