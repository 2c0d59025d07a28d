//! Handlers for `/contact` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contact` | All contact messages, oldest first |
//! | `POST` | `/contact` | JSON: `{"name","subject","message","email","contact"?}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use vigil_core::{
  form::ContactForm,
  record::ContactMessage,
  store::{AttachmentStore, RecordStore},
};

use crate::{
  ApiState, Created,
  error::{ApiError, Result},
};

/// `GET /contact`
pub async fn list<S, A>(
  State(state): State<Arc<ApiState<S, A>>>,
) -> Result<Json<Vec<ContactMessage>>>
where
  S: RecordStore,
  A: AttachmentStore,
{
  Ok(Json(state.retrieval.list_contacts().await?))
}

/// `POST /contact`
pub async fn create<S, A>(
  State(state): State<Arc<ApiState<S, A>>>,
  body: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<impl IntoResponse>
where
  S: RecordStore,
  A: AttachmentStore,
{
  let Json(form) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let id = state.submissions.submit_contact(form).await?;
  Ok((StatusCode::CREATED, Json(Created::new("Message sent successfully", id))))
}
