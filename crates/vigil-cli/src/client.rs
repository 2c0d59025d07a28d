//! Async HTTP client wrapping the Vigil report API.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::{
  Client, RequestBuilder, Response,
  multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;
use vigil_core::{
  attachment::Upload,
  form::{ContactForm, ReportForm},
  record::{ContactMessage, EmergencyReport, Report},
};

/// The server's acknowledgment of a submission.
#[derive(Debug, Deserialize)]
pub struct Receipt {
  pub message: String,
  pub id:      Uuid,
}

/// Error body returned by the API for any failed request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  message: String,
  #[serde(default)]
  error:   String,
}

/// Async HTTP client for the Vigil JSON/multipart API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    // Uploads can be large; allow for a slow uplink.
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let resp = check(resp, what).await?;
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))
  }

  // ── Submissions ───────────────────────────────────────────────────────────

  /// `POST /api/reports` (multipart)
  pub async fn submit_report(&self, form: &ReportForm, file: Option<Upload>) -> Result<Receipt> {
    let fields = [
      ("name", &form.name),
      ("location", &form.location),
      ("datetime", &form.datetime),
      ("subject", &form.subject),
      ("description", &form.description),
      ("contact", &form.contact),
      ("email", &form.email),
    ];

    let mut body = Form::new();
    for (name, value) in fields {
      if let Some(value) = value {
        body = body.text(name, value.clone());
      }
    }
    if let Some(file) = file {
      body = body.part("file", file_part(file)?);
    }

    let req = self.client.post(self.url("/reports")).multipart(body);
    self.send(req, "POST /reports").await
  }

  /// `POST /api/emergency` (multipart)
  pub async fn submit_emergency(&self, location: &str, file: Upload) -> Result<Receipt> {
    let body = Form::new()
      .text("location", location.to_owned())
      .part("file", file_part(file)?);

    let req = self.client.post(self.url("/emergency")).multipart(body);
    self.send(req, "POST /emergency").await
  }

  /// `POST /api/contact` (JSON)
  pub async fn submit_contact(&self, form: &ContactForm) -> Result<Receipt> {
    let req = self.client.post(self.url("/contact")).json(form);
    self.send(req, "POST /contact").await
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /api/reports`
  pub async fn list_reports(&self) -> Result<Vec<Report>> {
    self.send(self.client.get(self.url("/reports")), "GET /reports").await
  }

  /// `GET /api/emergency`
  pub async fn list_emergencies(&self) -> Result<Vec<EmergencyReport>> {
    self.send(self.client.get(self.url("/emergency")), "GET /emergency").await
  }

  /// `GET /api/contact`
  pub async fn list_contacts(&self) -> Result<Vec<ContactMessage>> {
    self.send(self.client.get(self.url("/contact")), "GET /contact").await
  }
}

fn file_part(file: Upload) -> Result<Part> {
  let mime = file
    .media_type()
    .or(file.content_type.as_deref())
    .unwrap_or("application/octet-stream")
    .to_owned();
  Part::bytes(file.bytes.to_vec())
    .file_name(file.original_name)
    .mime_str(&mime)
    .with_context(|| format!("invalid content type {mime}"))
}

async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) if !body.error.is_empty() => bail!("{what} → {status}: {} ({})", body.message, body.error),
    Ok(body) => bail!("{what} → {status}: {}", body.message),
    Err(_) => bail!("{what} → {status}"),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use bytes::Bytes;
  use tokio::net::TcpListener;
  use vigil_api::{NominatimGeocoder, RouterOptions};
  use vigil_files::LocalAttachmentStore;
  use vigil_store_sqlite::SqliteStore;

  use super::*;

  /// A real report server on an ephemeral port, backed by an in-memory store.
  async fn server() -> (ApiClient, tempfile::TempDir) {
    let uploads = tempfile::tempdir().unwrap();
    let app = vigil_api::router(
      Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      Arc::new(LocalAttachmentStore::new(uploads.path())),
      Arc::new(NominatimGeocoder::new("http://127.0.0.1:9/reverse")),
      RouterOptions {
        uploads_dir:      uploads.path().to_path_buf(),
        max_upload_bytes: vigil_api::DEFAULT_MAX_UPLOAD_BYTES,
      },
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (ApiClient::new(format!("http://{addr}/")).unwrap(), uploads)
  }

  fn report_form() -> ReportForm {
    ReportForm {
      name:        None,
      location:    Some("12.97, 77.59".into()),
      datetime:    Some("2025-03-01T21:15".into()),
      subject:     Some("Harassment".into()),
      description: Some("Followed near the bus stop".into()),
      contact:     None,
      email:       Some("asha@example.com".into()),
    }
  }

  fn png() -> Upload {
    Upload::new("photo.png", Some("image/png".into()), Bytes::from_static(b"\x89PNG fake"))
  }

  #[test]
  fn url_joins_api_prefix() {
    let client = ApiClient::new("http://localhost:5000/").unwrap();
    assert_eq!(client.url("/reports"), "http://localhost:5000/api/reports");
  }

  #[tokio::test]
  async fn report_with_attachment_round_trips() {
    let (client, uploads) = server().await;

    let receipt = client.submit_report(&report_form(), Some(png())).await.unwrap();
    assert_eq!(receipt.message, "Report submitted successfully");

    let reports = client.list_reports().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, receipt.id);
    assert_eq!(reports[0].subject, "Harassment");

    let file_ref = reports[0].file_ref.as_ref().unwrap();
    let stored = uploads.path().join(file_ref.storage_name().unwrap());
    assert_eq!(std::fs::read(stored).unwrap(), b"\x89PNG fake");
  }

  #[tokio::test]
  async fn emergency_round_trips() {
    let (client, _uploads) = server().await;

    let receipt = client.submit_emergency("1.5, 2.5", png()).await.unwrap();

    let emergencies = client.list_emergencies().await.unwrap();
    assert_eq!(emergencies.len(), 1);
    assert_eq!(emergencies[0].id, receipt.id);
    assert_eq!(emergencies[0].location, "1.5, 2.5");
  }

  #[tokio::test]
  async fn contact_round_trips() {
    let (client, _uploads) = server().await;
    let form = ContactForm {
      name:    Some("A".into()),
      subject: Some("S".into()),
      message: Some("M".into()),
      email:   Some("a@b.com".into()),
      contact: None,
    };

    client.submit_contact(&form).await.unwrap();

    let contacts = client.list_contacts().await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "a@b.com");
  }

  #[tokio::test]
  async fn server_rejection_is_described() {
    let (client, _uploads) = server().await;
    let form = ContactForm { name: Some("A".into()), ..Default::default() };

    let err = client.submit_contact(&form).await.unwrap_err().to_string();

    assert!(err.starts_with("POST /contact → 400 Bad Request"), "{err}");
    assert!(err.contains("subject"), "{err}");
    assert!(client.list_contacts().await.unwrap().is_empty());
  }
}
