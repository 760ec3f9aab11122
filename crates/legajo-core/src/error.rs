//! Error types for `legajo-core`.

use thiserror::Error;

use crate::{reconcile::ReconcileError, validation::JustificationError};

/// How a backend call failed. Produced by transport implementations and
/// classified by the query layer (404 → "no data", network → retry once).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("backend rejected request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("network error: {0}")]
  Network(String),

  #[error("could not decode response: {0}")]
  Decode(String),
}

impl TransportError {
  /// Whether a read that failed this way is worth one more attempt.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::Network(_) => true,
      Self::Rejected { status, .. } => *status >= 500,
      _ => false,
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Field-scoped problems found before any network call.
  #[error("validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  #[error("persona {0} is already linked to this subject")]
  DuplicateLink(i64),

  #[error("persona {0} cannot be linked to itself")]
  SelfLink(i64),

  #[error("vinculo {0} is not active")]
  NotActive(i64),

  /// The backend refused a mutation; the cached view may be stale.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("transport error: {0}")]
  Transport(TransportError),

  #[error("reconcile error: {0}")]
  Reconcile(#[from] ReconcileError),
}

impl From<TransportError> for Error {
  fn from(e: TransportError) -> Self {
    match e {
      TransportError::Conflict(msg) => Self::Conflict(msg),
      other => Self::Transport(other),
    }
  }
}

impl From<JustificationError> for Error {
  fn from(e: JustificationError) -> Self {
    match e {
      JustificationError::TooShort { min, .. } => {
        Self::Validation(vec![format!(
          "La justificación debe tener al menos {min} caracteres"
        )])
      }
    }
  }
}

impl Error {
  /// Local rejections that the user fixes by editing the form.
  pub fn is_user_correctable(&self) -> bool {
    matches!(
      self,
      Self::Validation(_) | Self::DuplicateLink(_) | Self::SelfLink(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
