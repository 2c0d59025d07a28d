//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports` | All reports, oldest first |
//! | `POST` | `/reports` | Multipart: `location`, `datetime`, `subject`, `description` required; `name`, `contact`, `email`, `file` optional |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::StatusCode,
  response::IntoResponse,
};
use vigil_core::{
  record::Report,
  store::{AttachmentStore, RecordStore},
};

use crate::{ApiState, Created, error::Result, multipart::FormParts};

/// `GET /reports`
pub async fn list<S, A>(State(state): State<Arc<ApiState<S, A>>>) -> Result<Json<Vec<Report>>>
where
  S: RecordStore,
  A: AttachmentStore,
{
  Ok(Json(state.retrieval.list_reports().await?))
}

/// `POST /reports`
pub async fn create<S, A>(
  State(state): State<Arc<ApiState<S, A>>>,
  multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse>
where
  S: RecordStore,
  A: AttachmentStore,
{
  let mut parts = FormParts::read(multipart).await?;
  let form = parts.report_form();
  let id = state.submissions.submit_report(form, parts.file).await?;
  Ok((StatusCode::CREATED, Json(Created::new("Report submitted successfully", id))))
}
