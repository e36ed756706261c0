//! [`Registry`] — the operations the transport layer calls.
//!
//! Every create follows the same order: validate parameters, check foreign
//! references, allocate an identifier, persist. A failure before allocation
//! leaves the store untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Params, Result,
  allocator::IdAllocator,
  analytics::{Aggregator, Analytics},
  bootstrap,
  entity::{
    CaseRecord, Entity, EntityKind, Facility, Individual, Practitioner, Stored,
    parse_reference,
  },
  integrity::IntegrityChecker,
  relationship::{LinkMap, Relationships},
  repository::Repository,
  store::KvStore,
};

/// A new practitioner ↔ individual link, as reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  #[serde(rename = "doctor_ID")]
  pub practitioner_id: u64,
  #[serde(rename = "patient_ID")]
  pub individual_id:   u64,
  /// `false` when the pair was already linked.
  pub added:           bool,
}

pub struct Registry<S> {
  store:     Arc<S>,
  ids:       IdAllocator<S>,
  repo:      Repository<S>,
  integrity: IntegrityChecker<S>,
  links:     Relationships<S>,
}

impl<S: KvStore> Registry<S> {
  /// Wire every component to the same store handle.
  pub fn new(store: Arc<S>) -> Self {
    let ids = IdAllocator::new(Arc::clone(&store));
    let repo = Repository::new(Arc::clone(&store));
    let integrity = IntegrityChecker::new(repo.clone());
    let links = Relationships::new(Arc::clone(&store), integrity.clone());
    Self { store, ids, repo, integrity, links }
  }

  pub async fn bootstrap(&self) -> Result<bool> { bootstrap::bootstrap(&*self.store).await }

  pub fn ids(&self) -> &IdAllocator<S> { &self.ids }

  pub fn repository(&self) -> &Repository<S> { &self.repo }

  pub fn relationships(&self) -> &Relationships<S> { &self.links }

  // ── Creates ───────────────────────────────────────────────────────────

  pub async fn create_facility(&self, params: &Params) -> Result<Stored<Facility>> {
    let record = Facility::from_params(params)?;
    self.insert(record).await
  }

  pub async fn create_practitioner(&self, params: &Params) -> Result<Stored<Practitioner>> {
    let record = Practitioner::from_params(params)?;
    self
      .integrity
      .ensure_optional(EntityKind::Facility, record.facility_id)
      .await?;
    self.insert(record).await
  }

  pub async fn create_individual(&self, params: &Params) -> Result<Stored<Individual>> {
    let record = Individual::from_params(params)?;
    self.insert(record).await
  }

  pub async fn create_case_record(&self, params: &Params) -> Result<Stored<CaseRecord>> {
    let record = CaseRecord::from_params(params)?;
    self
      .integrity
      .ensure(EntityKind::Individual, record.individual_id)
      .await?;
    self.insert(record).await
  }

  /// Link from `doctor_ID` and `patient_ID` parameters.
  pub async fn link(&self, params: &Params) -> Result<Link> {
    let practitioner = params.required("doctor_ID")?;
    let individual = params.required("patient_ID")?;
    let practitioner_id = parse_reference(EntityKind::Practitioner, practitioner)?;
    let individual_id = parse_reference(EntityKind::Individual, individual)?;

    let added = self.links.link(practitioner_id, individual_id).await?;
    Ok(Link { practitioner_id, individual_id, added })
  }

  async fn insert<E: Entity>(&self, record: E) -> Result<Stored<E>> {
    let id = self.ids.allocate(E::KIND).await?;
    self.repo.put_entity(id, &record).await?;
    debug!(kind = %E::KIND, id, "record created");
    Ok(Stored { id, record })
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn list<E: Entity>(&self) -> Result<Vec<Stored<E>>> {
    self.repo.scan_entities::<E>().await
  }

  pub async fn list_links(&self) -> Result<LinkMap> { self.links.all_links().await }

  pub async fn analytics(&self) -> Result<Analytics> {
    Aggregator::new(self.ids.clone(), self.repo.clone(), self.links.clone())
      .compute()
      .await
  }
}
