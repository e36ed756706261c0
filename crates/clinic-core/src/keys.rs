//! The key namespace. Nothing outside this crate builds or parses these keys.

use crate::entity::EntityKind;

/// Presence means the counters have been initialised.
pub const DB_INITIATED: &str = "db_initiated";

/// Holds the next identifier to assign for `kind`.
pub fn counter(kind: EntityKind) -> String { format!("{}:autoID", kind.prefix()) }

pub fn record(kind: EntityKind, id: u64) -> String {
  format!("{}:{id}", kind.prefix())
}

/// Set of individual ids linked to one practitioner.
pub fn links(practitioner_id: u64) -> String {
  format!("doctor-patient:{practitioner_id}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_layout() {
    assert_eq!(counter(EntityKind::Facility), "hospital:autoID");
    assert_eq!(record(EntityKind::CaseRecord, 12), "diagnosis:12");
    assert_eq!(links(3), "doctor-patient:3");
  }
}
