//! Derived metrics, computed on demand by scanning the store.
//!
//! Nothing is cached or maintained incrementally; each call costs a linear
//! walk over practitioners and case records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  allocator::IdAllocator,
  entity::{EntityKind, INDIVIDUAL_REF},
  relationship::Relationships,
  repository::Repository,
  store::KvStore,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
  pub total_hospitals:           u64,
  pub total_doctors:             u64,
  pub total_patients:            u64,
  pub total_diagnoses:           u64,
  /// Mean number of linked individuals over every practitioner id.
  pub avg_patients_per_doctor:   f64,
  /// Mean number of case records over individuals that have at least one.
  pub avg_diagnoses_per_patient: f64,
}

pub struct Aggregator<S> {
  ids:   IdAllocator<S>,
  repo:  Repository<S>,
  links: Relationships<S>,
}

impl<S: KvStore> Aggregator<S> {
  pub fn new(ids: IdAllocator<S>, repo: Repository<S>, links: Relationships<S>) -> Self {
    Self { ids, repo, links }
  }

  pub async fn compute(&self) -> Result<Analytics> {
    let total_hospitals = self.ids.allocated(EntityKind::Facility).await?;
    let total_doctors = self.ids.allocated(EntityKind::Practitioner).await?;
    let total_patients = self.ids.allocated(EntityKind::Individual).await?;
    let total_diagnoses = self.ids.allocated(EntityKind::CaseRecord).await?;

    let mut linked = Vec::new();
    for id in 1..=total_doctors {
      linked.push(self.links.members_of(id).await?.len() as u64);
    }

    // Grouped on the raw reference field alone, so a case record that fails
    // to decode elsewhere still counts here.
    let mut per_individual: HashMap<&str, u64> = HashMap::new();
    let cases = self.repo.scan(EntityKind::CaseRecord).await?;
    for (_, fields) in &cases {
      match fields.get(INDIVIDUAL_REF).map(String::as_str) {
        Some(individual) if !individual.is_empty() => {
          *per_individual.entry(individual).or_default() += 1;
        }
        _ => {}
      }
    }

    Ok(Analytics {
      total_hospitals,
      total_doctors,
      total_patients,
      total_diagnoses,
      avg_patients_per_doctor: round2(mean(linked.iter().copied())),
      avg_diagnoses_per_patient: round2(mean(per_individual.into_values())),
    })
  }
}

/// Arithmetic mean; `0.0` for an empty sequence.
fn mean(values: impl Iterator<Item = u64>) -> f64 {
  let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + v, c + 1));
  if count == 0 { 0.0 } else { sum as f64 / count as f64 }
}

/// Round to two decimal places for presentation.
pub fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }
