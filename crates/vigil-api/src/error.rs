//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vigil_core::form::ValidationError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] vigil_core::Error),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("malformed multipart body: {0}")]
  Multipart(#[from] MultipartError),

  #[error("geocoder error: {0}")]
  Upstream(String),
}

impl From<ValidationError> for ApiError {
  fn from(e: ValidationError) -> Self { Self::Core(e.into()) }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use vigil_core::Error as Core;
    match self {
      Self::Core(Core::Validation(_)) => StatusCode::BAD_REQUEST,
      Self::Core(Core::UnsupportedMediaType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      Self::Core(Core::NotFound(_)) => StatusCode::NOT_FOUND,
      Self::Core(Core::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      // Covers 413 when the body limit is exceeded.
      Self::Multipart(e) => e.status(),
      Self::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
  }

  fn summary(&self) -> &'static str {
    use vigil_core::Error as Core;
    match self {
      Self::Core(Core::Validation(_)) => "Invalid submission",
      Self::Core(Core::UnsupportedMediaType(_)) => "Unsupported file type",
      Self::Core(Core::NotFound(_)) => "Not found",
      Self::Core(Core::Storage(_)) => "Storage failure",
      Self::BadRequest(_) | Self::Multipart(_) => "Bad request",
      Self::Upstream(_) => "Geocoding service unavailable",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();

    // Core failures are logged where they happen.
    if !matches!(self, Self::Core(_)) {
      if status.is_server_error() {
        tracing::error!(%status, "{self}");
      } else {
        tracing::warn!(%status, "{self}");
      }
    }

    let mut body = json!({ "message": self.summary(), "error": self.to_string() });
    if let Self::Core(vigil_core::Error::Validation(v)) = &self {
      body["missing"] = json!(v.missing);
      body["invalid"] = json!(v.invalid);
    }
    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
