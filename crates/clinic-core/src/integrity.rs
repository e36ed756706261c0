//! Write-time referential integrity.
//!
//! References are checked once, when the referencing record is created, and
//! never again; there is no cascading update or delete.

use tracing::debug;

use crate::{Error, Result, entity::EntityKind, repository::Repository, store::KvStore};

pub struct IntegrityChecker<S> {
  repo: Repository<S>,
}

impl<S> Clone for IntegrityChecker<S> {
  fn clone(&self) -> Self { Self { repo: self.repo.clone() } }
}

impl<S: KvStore> IntegrityChecker<S> {
  pub fn new(repo: Repository<S>) -> Self { Self { repo } }

  pub async fn exists(&self, kind: EntityKind, id: u64) -> Result<bool> {
    self.repo.contains(kind, id).await
  }

  /// Fail with [`Error::Reference`] unless `kind:id` is stored.
  pub async fn ensure(&self, kind: EntityKind, id: u64) -> Result<()> {
    if self.exists(kind, id).await? {
      Ok(())
    } else {
      debug!(%kind, id, "dangling reference rejected");
      Err(Error::Reference { kind, reference: id.to_string() })
    }
  }

  /// As [`Self::ensure`], but an absent optional reference passes.
  pub async fn ensure_optional(&self, kind: EntityKind, id: Option<u64>) -> Result<()> {
    match id {
      Some(id) => self.ensure(kind, id).await,
      None => Ok(()),
    }
  }
}
