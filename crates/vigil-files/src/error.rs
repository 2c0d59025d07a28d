//! Error type for `vigil-files`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The upload's media type is not one we store.
  #[error("unsupported media type: {0}")]
  Unsupported(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl From<Error> for vigil_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Unsupported(t) => vigil_core::Error::UnsupportedMediaType(t),
      other => vigil_core::Error::storage(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
