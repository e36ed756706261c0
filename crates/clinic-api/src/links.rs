//! Handlers for `/doctor-patient`.
//!
//! `GET` returns `{ "<doctor id>": [<patient id>, ...] }` for every doctor
//! with at least one patient. `POST` takes `doctor_ID` and `patient_ID`.

use std::sync::Arc;

use axum::{Json, extract::State};
use clinic_core::{KvStore, Registry, registry::Link, relationship::LinkMap};

use crate::{error::ApiError, params::WriteParams};

/// `GET /doctor-patient`
pub async fn list<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
) -> Result<Json<LinkMap>, ApiError> {
  Ok(Json(registry.list_links().await?))
}

/// `POST /doctor-patient` — linking an existing pair again is not an error.
pub async fn create<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
  WriteParams(params): WriteParams,
) -> Result<Json<Link>, ApiError> {
  Ok(Json(registry.link(&params).await?))
}
