//! Error type for `vigil-wearable` and its JSON rendering.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0} is not configured")]
  NotConfigured(&'static str),

  /// The fitness provider answered with a non-success status.
  #[error("provider returned {status}")]
  Provider { status: StatusCode, body: Value },

  #[error("provider unreachable: {0}")]
  Http(#[from] reqwest::Error),
}

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
      Self::Provider { status, .. } => *status,
      Self::Http(_) => StatusCode::BAD_GATEWAY,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(%status, "{self}");
    } else {
      tracing::warn!(%status, "{self}");
    }

    let detail = match &self {
      // Surface the provider's own error list when it sent one.
      Self::Provider { body, .. } => body.get("errors").cloned().unwrap_or_else(|| body.clone()),
      other => Value::String(other.to_string()),
    };
    (status, Json(json!({ "success": false, "errors": [detail] }))).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
