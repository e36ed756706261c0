//! Handler for `GET /analytics`.

use std::sync::Arc;

use axum::{Json, extract::State};
use clinic_core::{KvStore, Registry, analytics::Analytics};

use crate::error::ApiError;

/// Recomputed from the store on every call.
pub async fn handler<S: KvStore + 'static>(
  State(registry): State<Arc<Registry<S>>>,
) -> Result<Json<Analytics>, ApiError> {
  Ok(Json(registry.analytics().await?))
}
