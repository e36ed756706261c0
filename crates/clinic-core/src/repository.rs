//! Record storage: one hash per record at `{kind}:{id}`.

use std::sync::Arc;

use tracing::warn;

use crate::{
  Error, Result,
  allocator::IdAllocator,
  entity::{Entity, EntityKind, Stored},
  keys,
  store::{Fields, KvStore},
};

pub struct Repository<S> {
  store: Arc<S>,
  ids:   IdAllocator<S>,
}

impl<S> Clone for Repository<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), ids: self.ids.clone() }
  }
}

impl<S: KvStore> Repository<S> {
  pub fn new(store: Arc<S>) -> Self {
    let ids = IdAllocator::new(Arc::clone(&store));
    Self { store, ids }
  }

  // ── Raw field maps ────────────────────────────────────────────────────

  /// The stored fields of `kind:id`, or `None` if no field is set.
  pub async fn get(&self, kind: EntityKind, id: u64) -> Result<Option<Fields>> {
    let fields = self
      .store
      .hash_get_all(&keys::record(kind, id))
      .await
      .map_err(Error::store)?;
    Ok((!fields.is_empty()).then_some(fields))
  }

  /// Overwrite `kind:id` with exactly `fields`.
  pub async fn put(&self, kind: EntityKind, id: u64, fields: &Fields) -> Result<()> {
    self
      .store
      .hash_replace(&keys::record(kind, id), fields)
      .await
      .map_err(Error::store)
  }

  /// Whether `kind:id` holds a record.
  pub async fn contains(&self, kind: EntityKind, id: u64) -> Result<bool> {
    self
      .store
      .exists(&keys::record(kind, id))
      .await
      .map_err(Error::store)
  }

  /// Every present record of `kind` in ascending identifier order.
  ///
  /// The upper bound is the counter value at call time. Identifiers without a
  /// record are skipped. Records written concurrently may or may not appear.
  pub async fn scan(&self, kind: EntityKind) -> Result<Vec<(u64, Fields)>> {
    let end = self.ids.next_id(kind).await?;
    let mut out = Vec::new();
    for id in 1..end {
      if let Some(fields) = self.get(kind, id).await? {
        out.push((id, fields));
      }
    }
    Ok(out)
  }

  // ── Typed records ─────────────────────────────────────────────────────

  pub async fn get_entity<E: Entity>(&self, id: u64) -> Result<Option<Stored<E>>> {
    self
      .get(E::KIND, id)
      .await?
      .map(|fields| decode::<E>(id, &fields))
      .transpose()
  }

  pub async fn put_entity<E: Entity>(&self, id: u64, record: &E) -> Result<()> {
    self.put(E::KIND, id, &record.to_fields()).await
  }

  /// Every present record of `E` that decodes. A record that does not is
  /// logged and left out, so one bad entry cannot hide the rest; reading it
  /// directly through [`Self::get_entity`] still reports [`Error::Decode`].
  pub async fn scan_entities<E: Entity>(&self) -> Result<Vec<Stored<E>>> {
    let mut out = Vec::new();
    for (id, fields) in self.scan(E::KIND).await? {
      match decode::<E>(id, &fields) {
        Ok(stored) => out.push(stored),
        Err(err) => warn!(kind = %E::KIND, id, %err, "skipping undecodable record"),
      }
    }
    Ok(out)
  }
}

fn decode<E: Entity>(id: u64, fields: &Fields) -> Result<Stored<E>> {
  let record = E::from_fields(fields)
    .map_err(|reason| Error::Decode { kind: E::KIND, id, reason })?;
  Ok(Stored { id, record })
}
