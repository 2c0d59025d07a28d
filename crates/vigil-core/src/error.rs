//! Error types for `vigil-core`.

use thiserror::Error;

use crate::form::ValidationError;

/// The failure taxonomy shared by every submission and retrieval path.
#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing, empty, or unparseable. Always recoverable
  /// by the caller correcting its input.
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The attachment's content type is outside the accepted set.
  #[error("unsupported media type: {0}")]
  UnsupportedMediaType(String),

  /// The persistence layer was unreachable or a write failed.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("not found: {0}")]
  NotFound(String),
}

impl Error {
  /// Wrap any backend error as [`Error::Storage`].
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
