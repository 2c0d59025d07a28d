//! JSON/multipart HTTP API for Vigil.
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`],
//! [`AttachmentStore`] and [`Geocoder`]. TLS and auth are the caller's
//! responsibility.
//!
//! # Routes
//!
//! ```text
//! /api/reports          GET, POST (multipart)
//! /api/emergency        GET, POST (multipart)
//! /api/contact          GET, POST (JSON)
//! /api/reverse-geocode  GET ?lat=&lon=
//! /uploads/<name>       stored attachments
//! ```

pub mod contact;
pub mod emergency;
pub mod error;
pub mod geocode;
pub mod multipart;
pub mod reports;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use uuid::Uuid;
use vigil_core::{
  geocode::Geocoder,
  record::UPLOADS_PREFIX,
  service::{RetrievalService, SubmissionService},
  store::{AttachmentStore, RecordStore},
};

pub use error::ApiError;
pub use geocode::NominatimGeocoder;

/// Default request body limit: 50 MiB, enough for a short phone video.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through the record handlers.
pub struct ApiState<S, A> {
  pub submissions: SubmissionService<S, A>,
  pub retrieval:   RetrievalService<S>,
}

impl<S: RecordStore, A: AttachmentStore> ApiState<S, A> {
  pub fn new(store: Arc<S>, attachments: Arc<A>) -> Self {
    Self {
      submissions: SubmissionService::new(store.clone(), attachments),
      retrieval:   RetrievalService::new(store),
    }
  }
}

/// Transport settings for [`router`].
#[derive(Debug, Clone)]
pub struct RouterOptions {
  /// Directory served under `/uploads`; must be the attachment store's root.
  pub uploads_dir:      PathBuf,
  pub max_upload_bytes: usize,
}

/// Acknowledgment body for a successful submission.
#[derive(Debug, Serialize)]
pub struct Created {
  pub message: &'static str,
  pub id:      Uuid,
}

impl Created {
  pub fn new(message: &'static str, id: Uuid) -> Self { Self { message, id } }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the `/api` routes for `store`, `attachments` and `geocoder`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A, G>(store: Arc<S>, attachments: Arc<A>, geocoder: Arc<G>) -> Router<()>
where
  S: RecordStore + 'static,
  A: AttachmentStore + 'static,
  G: Geocoder + 'static,
{
  let state = Arc::new(ApiState::new(store, attachments));

  let records = Router::new()
    .route("/reports", get(reports::list::<S, A>).post(reports::create::<S, A>))
    .route("/emergency", get(emergency::list::<S, A>).post(emergency::create::<S, A>))
    .route("/contact", get(contact::list::<S, A>).post(contact::create::<S, A>))
    .with_state(state);

  let geocoding = Router::new()
    .route("/reverse-geocode", get(geocode::reverse::<G>))
    .with_state(geocoder);

  records.merge(geocoding)
}

/// Build the complete application: `/api`, static `/uploads`, body limit,
/// CORS and request tracing.
pub fn router<S, A, G>(
  store: Arc<S>,
  attachments: Arc<A>,
  geocoder: Arc<G>,
  options: RouterOptions,
) -> Router
where
  S: RecordStore + 'static,
  A: AttachmentStore + 'static,
  G: Geocoder + 'static,
{
  Router::new()
    .nest("/api", api_router(store, attachments, geocoder))
    .nest_service(UPLOADS_PREFIX, ServeDir::new(options.uploads_dir))
    .layer(DefaultBodyLimit::max(options.max_upload_bytes))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
