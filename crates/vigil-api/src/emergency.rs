//! Handlers for `/emergency` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/emergency` | All SOS submissions, oldest first |
//! | `POST` | `/emergency` | Multipart: `location` and `file`, both required |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::StatusCode,
  response::IntoResponse,
};
use vigil_core::{
  record::EmergencyReport,
  store::{AttachmentStore, RecordStore},
};

use crate::{ApiState, Created, error::Result, multipart::FormParts};

/// `GET /emergency`
pub async fn list<S, A>(
  State(state): State<Arc<ApiState<S, A>>>,
) -> Result<Json<Vec<EmergencyReport>>>
where
  S: RecordStore,
  A: AttachmentStore,
{
  Ok(Json(state.retrieval.list_emergencies().await?))
}

/// `POST /emergency`
pub async fn create<S, A>(
  State(state): State<Arc<ApiState<S, A>>>,
  multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse>
where
  S: RecordStore,
  A: AttachmentStore,
{
  let mut parts = FormParts::read(multipart).await?;
  let form = parts.emergency_form();
  let id = state.submissions.submit_emergency(form, parts.file).await?;
  Ok((StatusCode::CREATED, Json(Created::new("Emergency report submitted", id))))
}
