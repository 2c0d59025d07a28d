//! The submission and retrieval services.
//!
//! Both are generic over the storage traits so the HTTP layer, the binaries
//! and the tests can plug in whichever backend they hold.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
  attachment::Upload,
  error::{Error, Result},
  form::{ContactForm, EmergencyForm, ReportForm},
  record::{
    ContactMessage, EmergencyReport, FileRef, NewEmergencyReport, NewRecord,
    RecordKind, Report,
  },
  store::{AttachmentStore, RecordStore},
};

// ─── Submission ──────────────────────────────────────────────────────────────

/// Validates submissions, hands attachments to the file intake and persists
/// the resulting records.
pub struct SubmissionService<S, A> {
  store:       Arc<S>,
  attachments: Arc<A>,
}

impl<S, A> Clone for SubmissionService<S, A> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), attachments: self.attachments.clone() }
  }
}

impl<S: RecordStore, A: AttachmentStore> SubmissionService<S, A> {
  pub fn new(store: Arc<S>, attachments: Arc<A>) -> Self {
    Self { store, attachments }
  }

  /// Accept an incident report with an optional attachment.
  pub async fn submit_report(
    &self,
    form: ReportForm,
    upload: Option<Upload>,
  ) -> Result<Uuid> {
    let mut report = form
      .validate(Utc::now())
      .inspect_err(|e| warn!(kind = %RecordKind::Report, "rejected: {e}"))?;

    if let Some(upload) = upload {
      report.file_ref = Some(self.store_upload(RecordKind::Report, upload).await?);
    }

    let orphan = report.file_ref.clone();
    self.persist(NewRecord::Report(report), orphan).await
  }

  /// Accept an SOS submission. The attachment is mandatory.
  pub async fn submit_emergency(
    &self,
    form: EmergencyForm,
    upload: Option<Upload>,
  ) -> Result<Uuid> {
    let location = form
      .validate(upload.is_some())
      .inspect_err(|e| warn!(kind = %RecordKind::Emergency, "rejected: {e}"))?;

    let Some(upload) = upload else {
      return Err(Error::Validation(Default::default()));
    };
    let file_ref = self.store_upload(RecordKind::Emergency, upload).await?;

    let record = NewRecord::Emergency(NewEmergencyReport {
      file_ref: file_ref.clone(),
      location,
      created_at: Utc::now(),
    });
    self.persist(record, Some(file_ref)).await
  }

  /// Accept a contact-form message.
  pub async fn submit_contact(&self, form: ContactForm) -> Result<Uuid> {
    let message = form
      .validate(Utc::now())
      .inspect_err(|e| warn!(kind = %RecordKind::Contact, "rejected: {e}"))?;
    self.persist(NewRecord::Contact(message), None).await
  }

  async fn store_upload(&self, kind: RecordKind, upload: Upload) -> Result<FileRef> {
    self.attachments.store(upload).await.map_err(|e| {
      let e: Error = e.into();
      match &e {
        Error::UnsupportedMediaType(t) => warn!(%kind, media_type = %t, "rejected attachment"),
        other => error!(%kind, "failed to store attachment: {other}"),
      }
      e
    })
  }

  async fn persist(&self, record: NewRecord, written: Option<FileRef>) -> Result<Uuid> {
    let kind = record.kind();
    match self.store.insert(record).await {
      Ok(id) => {
        info!(%kind, %id, "record persisted");
        Ok(id)
      }
      Err(e) => {
        error!(%kind, "failed to persist record: {e}");
        if let Some(file_ref) = written {
          warn!(%kind, %file_ref, "orphaned attachment left in uploads directory");
        }
        Err(Error::storage(e))
      }
    }
  }
}

// ─── Retrieval ───────────────────────────────────────────────────────────────

/// Read-only listings for the dashboard.
pub struct RetrievalService<S> {
  store: Arc<S>,
}

impl<S> Clone for RetrievalService<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: RecordStore> RetrievalService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn list_reports(&self) -> Result<Vec<Report>> {
    self.store.find_reports().await.map_err(log_read_failure)
  }

  pub async fn list_emergencies(&self) -> Result<Vec<EmergencyReport>> {
    self.store.find_emergencies().await.map_err(log_read_failure)
  }

  pub async fn list_contacts(&self) -> Result<Vec<ContactMessage>> {
    self.store.find_contacts().await.map_err(log_read_failure)
  }
}

fn log_read_failure<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  error!("failed to read records: {e}");
  Error::storage(e)
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use bytes::Bytes;

  use super::*;
  use crate::record::{NewContactMessage, NewReport};

  // ─── Fakes ─────────────────────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("store offline")]
  struct Offline;

  #[derive(Default)]
  struct MemoryStore {
    reports:     Mutex<Vec<Report>>,
    emergencies: Mutex<Vec<EmergencyReport>>,
    contacts:    Mutex<Vec<ContactMessage>>,
    offline:     bool,
  }

  impl RecordStore for MemoryStore {
    type Error = Offline;

    async fn insert(&self, record: NewRecord) -> Result<Uuid, Offline> {
      if self.offline {
        return Err(Offline);
      }
      let id = Uuid::new_v4();
      match record {
        NewRecord::Report(NewReport {
          name, location, datetime, subject, description, contact, email,
          file_ref, created_at,
        }) => self.reports.lock().unwrap().push(Report {
          id, name, location, datetime, subject, description, contact, email,
          file_ref, created_at,
        }),
        NewRecord::Emergency(e) => self.emergencies.lock().unwrap().push(EmergencyReport {
          id,
          file_ref: e.file_ref,
          location: e.location,
          created_at: e.created_at,
        }),
        NewRecord::Contact(NewContactMessage {
          name, subject, message, email, contact, created_at,
        }) => self.contacts.lock().unwrap().push(ContactMessage {
          id, name, subject, message, email, contact, created_at,
        }),
      }
      Ok(id)
    }

    async fn find_reports(&self) -> Result<Vec<Report>, Offline> {
      Ok(self.reports.lock().unwrap().clone())
    }

    async fn find_emergencies(&self) -> Result<Vec<EmergencyReport>, Offline> {
      Ok(self.emergencies.lock().unwrap().clone())
    }

    async fn find_contacts(&self) -> Result<Vec<ContactMessage>, Offline> {
      Ok(self.contacts.lock().unwrap().clone())
    }

    async fn count(&self, kind: RecordKind) -> Result<u64, Offline> {
      let n = match kind {
        RecordKind::Report => self.reports.lock().unwrap().len(),
        RecordKind::Emergency => self.emergencies.lock().unwrap().len(),
        RecordKind::Contact => self.contacts.lock().unwrap().len(),
      };
      Ok(n as u64)
    }
  }

  #[derive(Debug, thiserror::Error)]
  #[error("unsupported: {0}")]
  struct Unsupported(String);

  impl From<Unsupported> for Error {
    fn from(e: Unsupported) -> Self { Error::UnsupportedMediaType(e.0) }
  }

  #[derive(Default)]
  struct RecordingAttachments {
    stored: Mutex<Vec<String>>,
  }

  impl AttachmentStore for RecordingAttachments {
    type Error = Unsupported;

    async fn store(&self, upload: Upload) -> Result<FileRef, Unsupported> {
      if upload.media_type().is_none() {
        return Err(Unsupported(upload.content_type.unwrap_or_default()));
      }
      self.stored.lock().unwrap().push(upload.original_name.clone());
      Ok(FileRef::for_storage_name(&upload.original_name))
    }
  }

  fn services(
    store: MemoryStore,
  ) -> (
    SubmissionService<MemoryStore, RecordingAttachments>,
    RetrievalService<MemoryStore>,
    Arc<MemoryStore>,
    Arc<RecordingAttachments>,
  ) {
    let store = Arc::new(store);
    let files = Arc::new(RecordingAttachments::default());
    (
      SubmissionService::new(store.clone(), files.clone()),
      RetrievalService::new(store.clone()),
      store,
      files,
    )
  }

  fn report_form() -> ReportForm {
    ReportForm {
      location: Some("Main St".into()),
      datetime: Some("2025-03-01T21:15".into()),
      subject: Some("Theft".into()),
      description: Some("Bike stolen".into()),
      ..Default::default()
    }
  }

  fn png(name: &str) -> Upload {
    Upload::new(name, Some("image/png".into()), Bytes::from_static(b"\x89PNG"))
  }

  // ─── Tests ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn report_is_listed_after_submission() {
    let (submit, retrieve, _, _) = services(MemoryStore::default());
    let before = Utc::now();

    let id = submit.submit_report(report_form(), Some(png("a.png"))).await.unwrap();

    let reports = retrieve.list_reports().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, id);
    assert_eq!(reports[0].subject, "Theft");
    assert!(reports[0].created_at >= before);
    assert_eq!(reports[0].file_ref.as_ref().map(|f| f.as_str()), Some("/uploads/a.png"));
  }

  #[tokio::test]
  async fn invalid_report_writes_nothing() {
    let (submit, _, store, files) = services(MemoryStore::default());
    let mut form = report_form();
    form.location = None;

    let err = submit.submit_report(form, Some(png("a.png"))).await.unwrap_err();

    assert!(matches!(err, Error::Validation(ref v) if v.missing == ["location"]));
    assert_eq!(store.count(RecordKind::Report).await.unwrap(), 0);
    assert!(files.stored.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unsupported_attachment_is_rejected() {
    let (submit, _, store, _) = services(MemoryStore::default());
    let pdf = Upload::new("doc.pdf", Some("application/pdf".into()), Bytes::new());

    let err = submit.submit_report(report_form(), Some(pdf)).await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedMediaType(_)));
    assert_eq!(store.count(RecordKind::Report).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn emergency_requires_file() {
    let (submit, _, store, _) = services(MemoryStore::default());
    let form = EmergencyForm { location: Some("1, 2".into()) };

    let err = submit.submit_emergency(form, None).await.unwrap_err();

    assert!(matches!(err, Error::Validation(ref v) if v.missing == ["file"]));
    assert_eq!(store.count(RecordKind::Emergency).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn emergency_is_persisted_with_reference() {
    let (submit, retrieve, _, _) = services(MemoryStore::default());
    let form = EmergencyForm { location: Some("1, 2".into()) };

    let id = submit.submit_emergency(form, Some(png("sos.png"))).await.unwrap();

    let listed = retrieve.list_emergencies().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].file_ref.as_str(), "/uploads/sos.png");
  }

  #[tokio::test]
  async fn store_failure_surfaces_as_storage_error() {
    let (submit, _, _, files) = services(MemoryStore { offline: true, ..Default::default() });

    let err = submit.submit_report(report_form(), Some(png("a.png"))).await.unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    // The attachment stays behind as an orphan.
    assert_eq!(files.stored.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn listing_twice_is_stable() {
    let (submit, retrieve, _, _) = services(MemoryStore::default());
    let form = ContactForm {
      name: Some("A".into()),
      subject: Some("S".into()),
      message: Some("M".into()),
      email: Some("a@b.com".into()),
      contact: None,
    };
    submit.submit_contact(form).await.unwrap();

    let first = retrieve.list_contacts().await.unwrap();
    let second = retrieve.list_contacts().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
  }
}
