//! Error types for `clinic-core`.

use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A required parameter is missing or empty, or a constrained parameter
  /// holds a value outside its domain.
  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },

  /// A foreign identifier does not resolve to a stored record.
  #[error("no {kind} with id {reference:?}")]
  Reference {
    kind:      EntityKind,
    reference: String,
  },

  /// The key-value store failed or could not be reached.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A stored record no longer decodes into its typed form.
  #[error("corrupt {kind} record {id}: {reason}")]
  Decode {
    kind:   EntityKind,
    id:     u64,
    reason: String,
  },

  /// A plain value (counter, sentinel) holds something other than an integer.
  #[error("corrupt value at {key:?}: {value:?}")]
  CorruptValue { key: String, value: String },
}

impl Error {
  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::StoreUnavailable(Box::new(err))
  }

  pub(crate) fn missing(field: &'static str) -> Self {
    Self::Validation { field, reason: "required".to_owned() }
  }

  /// Whether the caller, rather than the service, is at fault.
  pub fn is_client_error(&self) -> bool {
    matches!(self, Self::Validation { .. } | Self::Reference { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
