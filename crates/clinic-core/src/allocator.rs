//! Per-kind auto-increment identifiers.
//!
//! Each kind has one counter at `{kind}:autoID` holding the next identifier to
//! assign. Counters only ever move forward; identifiers are never reused.

use std::sync::Arc;

use tracing::debug;

use crate::{Error, Result, entity::EntityKind, keys, store::KvStore};

pub struct IdAllocator<S> {
  store: Arc<S>,
}

impl<S> Clone for IdAllocator<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: KvStore> IdAllocator<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// The identifier the next create of `kind` will receive. Read-only; `1`
  /// when the counter has never been initialised.
  pub async fn next_id(&self, kind: EntityKind) -> Result<u64> {
    let key = keys::counter(kind);
    match self.store.get(&key).await.map_err(Error::store)? {
      None => Ok(1),
      Some(raw) => raw
        .parse::<u64>()
        .map(|n| n.max(1))
        .map_err(|_| Error::CorruptValue { key, value: raw }),
    }
  }

  /// Number of identifiers handed out so far for `kind`, including any whose
  /// record write never completed.
  pub async fn allocated(&self, kind: EntityKind) -> Result<u64> {
    Ok(self.next_id(kind).await? - 1)
  }

  /// Atomically move the counter forward by one; returns the new counter
  /// value.
  pub async fn advance(&self, kind: EntityKind) -> Result<u64> {
    let key = keys::counter(kind);
    let after = self.store.incr(&key).await.map_err(Error::store)?;
    u64::try_from(after).map_err(|_| Error::CorruptValue { key, value: after.to_string() })
  }

  /// Reserve the next identifier for `kind`.
  ///
  /// Reservation is a single atomic increment, so concurrent writers always
  /// receive distinct identifiers. If the process dies before the record is
  /// persisted the identifier is lost and leaves a hole in the range.
  pub async fn allocate(&self, kind: EntityKind) -> Result<u64> {
    let mut after = self.advance(kind).await?;
    if after == 1 {
      // Counter was missing: identifiers start at 1, never 0.
      after = self.advance(kind).await?;
    }
    let id = after - 1;
    debug!(%kind, id, "allocated identifier");
    Ok(id)
  }
}
