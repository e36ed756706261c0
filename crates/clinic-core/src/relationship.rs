//! Practitioner ↔ individual links.
//!
//! Stored as one set of individual ids per practitioner at
//! `doctor-patient:{practitioner_id}`. There is no reverse index; finding the
//! practitioners of an individual means walking every owner.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use tracing::{debug, warn};

use crate::{
  Error, Result,
  allocator::IdAllocator,
  entity::EntityKind,
  integrity::IntegrityChecker,
  keys,
  store::KvStore,
};

/// All links, keyed by practitioner id.
pub type LinkMap = BTreeMap<u64, BTreeSet<u64>>;

pub struct Relationships<S> {
  store:     Arc<S>,
  ids:       IdAllocator<S>,
  integrity: IntegrityChecker<S>,
}

impl<S> Clone for Relationships<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      ids:       self.ids.clone(),
      integrity: self.integrity.clone(),
    }
  }
}

impl<S: KvStore> Relationships<S> {
  pub fn new(store: Arc<S>, integrity: IntegrityChecker<S>) -> Self {
    let ids = IdAllocator::new(Arc::clone(&store));
    Self { store, ids, integrity }
  }

  /// Link an individual to a practitioner. Both must exist. Linking an
  /// existing pair again changes nothing; the return value says whether the
  /// link is new.
  pub async fn link(&self, practitioner_id: u64, individual_id: u64) -> Result<bool> {
    self.integrity.ensure(EntityKind::Practitioner, practitioner_id).await?;
    self.integrity.ensure(EntityKind::Individual, individual_id).await?;

    let added = self
      .store
      .set_add(&keys::links(practitioner_id), &individual_id.to_string())
      .await
      .map_err(Error::store)?;
    debug!(practitioner_id, individual_id, added, "linked");
    Ok(added)
  }

  pub async fn members_of(&self, practitioner_id: u64) -> Result<BTreeSet<u64>> {
    let raw = self
      .store
      .set_members(&keys::links(practitioner_id))
      .await
      .map_err(Error::store)?;

    Ok(
      raw
        .into_iter()
        .filter_map(|m| match m.parse() {
          Ok(id) => Some(id),
          Err(_) => {
            warn!(practitioner_id, member = %m, "ignoring non-numeric link member");
            None
          }
        })
        .collect(),
    )
  }

  /// Every practitioner with at least one link. Practitioners are walked
  /// `1..counter` in order; no lock is held, so concurrent links may be
  /// partially visible.
  pub async fn all_links(&self) -> Result<LinkMap> {
    let end = self.ids.next_id(EntityKind::Practitioner).await?;
    let mut out = LinkMap::new();
    for id in 1..end {
      let members = self.members_of(id).await?;
      if !members.is_empty() {
        out.insert(id, members);
      }
    }
    Ok(out)
  }
}
