//! First-run initialisation of the counters.

use tracing::{debug, info};

use crate::{Error, Result, entity::EntityKind, keys, store::KvStore};

/// Set every counter to `1` and mark the store initialised, unless that has
/// already happened. Safe to call on every start; returns whether anything was
/// written.
pub async fn bootstrap<S: KvStore>(store: &S) -> Result<bool> {
  if store.get(keys::DB_INITIATED).await.map_err(Error::store)?.is_some() {
    debug!("store already initialised");
    return Ok(false);
  }

  for kind in EntityKind::ALL {
    store.set(&keys::counter(kind), "1").await.map_err(Error::store)?;
  }
  store.set(keys::DB_INITIATED, "1").await.map_err(Error::store)?;

  info!("initialised identifier counters");
  Ok(true)
}
