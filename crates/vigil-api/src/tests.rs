//! HTTP-level tests driving the full router against an in-memory SQLite store
//! and a temporary uploads directory.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use vigil_core::{
  geocode::{Coordinates, Geocoder},
  record::RecordKind,
  store::RecordStore,
};
use vigil_files::LocalAttachmentStore;
use vigil_store_sqlite::SqliteStore;

use crate::{RouterOptions, router};

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("geocoder unreachable")]
struct GeocoderDown;

/// Knows one address at latitude 1, nothing at latitude 2, and is down for
/// everything else.
struct FakeGeocoder;

impl Geocoder for FakeGeocoder {
  type Error = GeocoderDown;

  async fn reverse(&self, at: Coordinates) -> Result<Option<String>, GeocoderDown> {
    match at.latitude as i64 {
      1 => Ok(Some("1 Example Road, Springfield".into())),
      2 => Ok(None),
      _ => Err(GeocoderDown),
    }
  }
}

struct Harness {
  app:     Router,
  store:   Arc<SqliteStore>,
  uploads: tempfile::TempDir,
}

async fn harness_with_limit(max_upload_bytes: usize) -> Harness {
  let uploads = tempfile::tempdir().unwrap();
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let files = Arc::new(LocalAttachmentStore::new(uploads.path()));
  let app = router(
    store.clone(),
    files,
    Arc::new(FakeGeocoder),
    RouterOptions { uploads_dir: uploads.path().to_path_buf(), max_upload_bytes },
  );
  Harness { app, store, uploads }
}

async fn harness() -> Harness { harness_with_limit(crate::DEFAULT_MAX_UPLOAD_BYTES).await }

const BOUNDARY: &str = "vigil-test-boundary";

enum Part<'a> {
  Text(&'a str, &'a str),
  File { file_name: &'a str, content_type: &'a str, bytes: &'a [u8] },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
  let mut body = Vec::new();
  for part in parts {
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match part {
      Part::Text(name, value) => {
        body.extend_from_slice(
          format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .as_bytes(),
        );
      }
      Part::File { file_name, content_type, bytes } => {
        body.extend_from_slice(
          format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
          )
          .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
      }
    }
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

fn post_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
    .body(Body::from(multipart_body(parts)))
    .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
  app.clone().oneshot(req).await.unwrap()
}

async fn body_bytes(resp: Response) -> Vec<u8> {
  axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap()
    .to_vec()
}

async fn body_json(resp: Response) -> Value {
  serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

fn report_fields() -> Vec<Part<'static>> {
  vec![
    Part::Text("name", "Asha"),
    Part::Text("location", "12.97, 77.59"),
    Part::Text("datetime", "2025-03-01T21:15"),
    Part::Text("subject", "Harassment"),
    Part::Text("description", "Followed near the bus stop"),
  ]
}

// ─── Contact ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contact_is_created_and_listed() {
  let h = harness().await;

  let resp = send(
    &h.app,
    post_json(
      "/api/contact",
      json!({ "name": "A", "subject": "S", "message": "M", "email": "a@b.com" }),
    ),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created = body_json(resp).await;
  assert!(created["message"].is_string());
  let id = created["id"].as_str().unwrap().to_owned();

  let resp = send(&h.app, get("/api/contact")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let listed = body_json(resp).await;
  let listed = listed.as_array().unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0]["id"], id);
  assert_eq!(listed[0]["name"], "A");
  assert_eq!(listed[0]["email"], "a@b.com");
  assert!(listed[0]["createdAt"].is_string());
}

#[tokio::test]
async fn contact_missing_fields_is_400() {
  let h = harness().await;

  let resp = send(&h.app, post_json("/api/contact", json!({ "name": "A" }))).await;

  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = body_json(resp).await;
  assert_eq!(body["missing"], json!(["subject", "message", "email"]));
  assert!(body["error"].as_str().unwrap().contains("subject"));
  assert_eq!(h.store.count(RecordKind::Contact).await.unwrap(), 0);
}

#[tokio::test]
async fn contact_malformed_json_is_400() {
  let h = harness().await;
  let req = Request::builder()
    .method("POST")
    .uri("/api/contact")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();

  let resp = send(&h.app, req).await;

  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(body_json(resp).await["message"].is_string());
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_attachment_is_served_byte_for_byte() {
  let h = harness().await;
  let image: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR-not-really";
  let mut parts = report_fields();
  parts.push(Part::File { file_name: "evidence.png", content_type: "image/png", bytes: image });

  let resp = send(&h.app, post_multipart("/api/reports", &parts)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let listed = body_json(send(&h.app, get("/api/reports")).await).await;
  let file_ref = listed[0]["fileRef"].as_str().unwrap().to_owned();
  assert!(file_ref.starts_with("/uploads/"));
  assert_eq!(listed[0]["subject"], "Harassment");
  assert_eq!(listed[0]["datetime"], "2025-03-01T21:15:00Z");

  let resp = send(&h.app, get(&file_ref)).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_bytes(resp).await, image);
}

#[tokio::test]
async fn report_without_file_has_null_reference() {
  let h = harness().await;
  let mut parts = report_fields();
  // An untouched browser file input.
  parts.push(Part::File { file_name: "", content_type: "application/octet-stream", bytes: b"" });

  let resp = send(&h.app, post_multipart("/api/reports", &parts)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let listed = body_json(send(&h.app, get("/api/reports")).await).await;
  assert!(listed[0]["fileRef"].is_null());
}

#[tokio::test]
async fn report_missing_fields_leaves_store_unchanged() {
  let h = harness().await;
  let parts = [Part::Text("name", "Asha"), Part::Text("description", "")];

  let resp = send(&h.app, post_multipart("/api/reports", &parts)).await;

  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body = body_json(resp).await;
  assert_eq!(body["missing"], json!(["location", "datetime", "subject", "description"]));
  assert_eq!(body["invalid"], json!([]));
  assert_eq!(h.store.count(RecordKind::Report).await.unwrap(), 0);
}

#[tokio::test]
async fn report_with_unsupported_file_is_415() {
  let h = harness().await;
  let mut parts = report_fields();
  parts.push(Part::File { file_name: "notes.txt", content_type: "text/plain", bytes: b"hello" });

  let resp = send(&h.app, post_multipart("/api/reports", &parts)).await;

  assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert_eq!(h.store.count(RecordKind::Report).await.unwrap(), 0);
  assert_eq!(std::fs::read_dir(h.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn report_over_body_limit_is_413() {
  let h = harness_with_limit(1024).await;
  let big = vec![0u8; 4096];
  let mut parts = report_fields();
  parts.push(Part::File { file_name: "big.mp4", content_type: "video/mp4", bytes: &big });

  let resp = send(&h.app, post_multipart("/api/reports", &parts)).await;

  assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
  assert_eq!(h.store.count(RecordKind::Report).await.unwrap(), 0);
}

#[tokio::test]
async fn listing_twice_is_identical() {
  let h = harness().await;
  send(&h.app, post_multipart("/api/reports", &report_fields())).await;

  let a = body_bytes(send(&h.app, get("/api/reports")).await).await;
  let b = body_bytes(send(&h.app, get("/api/reports")).await).await;
  assert_eq!(a, b);
}

// ─── Emergency ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn emergency_is_created_with_attachment() {
  let h = harness().await;
  let parts = [
    Part::Text("location", "12.97, 77.59"),
    Part::File { file_name: "sos.mp4", content_type: "video/mp4", bytes: b"\x00\x00\x00\x18ftyp" },
  ];

  let resp = send(&h.app, post_multipart("/api/emergency", &parts)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let listed = body_json(send(&h.app, get("/api/emergency")).await).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
  assert_eq!(listed[0]["location"], "12.97, 77.59");
  assert!(listed[0]["fileRef"].as_str().unwrap().ends_with("-sos.mp4"));
}

#[tokio::test]
async fn emergency_without_file_is_400() {
  let h = harness().await;
  let parts = [Part::Text("location", "12.97, 77.59")];

  let resp = send(&h.app, post_multipart("/api/emergency", &parts)).await;

  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_eq!(body_json(resp).await["missing"], json!(["file"]));
  assert_eq!(h.store.count(RecordKind::Emergency).await.unwrap(), 0);
}

#[tokio::test]
async fn emergency_without_multipart_is_400() {
  let h = harness().await;

  let resp = send(&h.app, post_json("/api/emergency", json!({ "location": "x" }))).await;

  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Geocoding ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reverse_geocode_statuses() {
  let h = harness().await;

  let resp = send(&h.app, get("/api/reverse-geocode?lat=1.5&lon=2.5")).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["address"], "1 Example Road, Springfield");

  let resp = send(&h.app, get("/api/reverse-geocode?lat=2.5&lon=2.5")).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(&h.app, get("/api/reverse-geocode?lat=5&lon=5")).await;
  assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

  let resp = send(&h.app, get("/api/reverse-geocode?lat=1.5")).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = send(&h.app, get("/api/reverse-geocode?lat=north&lon=2")).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Static files ────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_upload_is_404() {
  let h = harness().await;
  let resp = send(&h.app, get("/uploads/does-not-exist.png")).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
