//! Handlers for the four record collections.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/hospital` `/doctor` `/patient` `/diagnosis` | All records, ascending id |
//! | `POST` | `/hospital` | `name`, `address`, `phone`, `beds_number` |
//! | `POST` | `/doctor` | `surname`, `profession`, optional `hospital_ID` |
//! | `POST` | `/patient` | `surname`, `born_date`, `sex` (`M`/`F`), `mpn` |
//! | `POST` | `/diagnosis` | `patient_ID`, `type`, `information` |
//!
//! Creates return 201 and the stored record, including its new `id`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use clinic_core::{
  KvStore, Registry,
  entity::{Entity, Stored},
};
use serde::Serialize;

use crate::{error::ApiError, params::WriteParams};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /{kind}`
pub async fn list<S, E>(
  State(registry): State<Arc<Registry<S>>>,
) -> Result<Json<Vec<Stored<E>>>, ApiError>
where
  S: KvStore + 'static,
  E: Entity + Serialize,
{
  Ok(Json(registry.list::<E>().await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

fn created<E: Serialize>(record: Stored<E>) -> impl IntoResponse {
  (StatusCode::CREATED, Json(record))
}

/// `POST /hospital`
pub async fn create_facility<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
  WriteParams(params): WriteParams,
) -> Result<impl IntoResponse, ApiError> {
  Ok(created(registry.create_facility(&params).await?))
}

/// `POST /doctor`
pub async fn create_practitioner<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
  WriteParams(params): WriteParams,
) -> Result<impl IntoResponse, ApiError> {
  Ok(created(registry.create_practitioner(&params).await?))
}

/// `POST /patient`
pub async fn create_individual<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
  WriteParams(params): WriteParams,
) -> Result<impl IntoResponse, ApiError> {
  Ok(created(registry.create_individual(&params).await?))
}

/// `POST /diagnosis`
pub async fn create_case_record<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
  WriteParams(params): WriteParams,
) -> Result<impl IntoResponse, ApiError> {
  Ok(created(registry.create_case_record(&params).await?))
}
