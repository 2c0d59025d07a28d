//! Record types: the three independent collections held by the record store.
//!
//! Records are append-only: once a submission is accepted it is never
//! updated or deleted. No record references another.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which collection a record lives in; also selects the validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
  Report,
  Emergency,
  Contact,
}

impl RecordKind {
  pub const ALL: [RecordKind; 3] =
    [RecordKind::Report, RecordKind::Emergency, RecordKind::Contact];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Report => "report",
      Self::Emergency => "emergency",
      Self::Contact => "contact",
    }
  }
}

impl fmt::Display for RecordKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── File reference ──────────────────────────────────────────────────────────

/// URL path prefix under which stored attachments are served.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// A relative reference to a stored attachment, e.g.
/// `/uploads/1718000000000-1a2b3c4d-photo.png`.
///
/// Only the file intake mints new references; everything else treats them as
/// opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
  /// Build the reference for a file stored under `storage_name`.
  pub fn for_storage_name(storage_name: &str) -> Self {
    Self(format!("{UPLOADS_PREFIX}/{storage_name}"))
  }

  /// Rehydrate a reference read back from storage.
  pub fn from_stored(raw: String) -> Self { Self(raw) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The bare storage name, if this reference points directly into the
  /// uploads directory (no nested segments, no `..`).
  pub fn storage_name(&self) -> Option<&str> {
    let name = self.0.strip_prefix(UPLOADS_PREFIX)?.strip_prefix('/')?;
    let plain = !name.is_empty()
      && name != "."
      && name != ".."
      && !name.contains(['/', '\\']);
    plain.then_some(name)
  }
}

impl fmt::Display for FileRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Persisted records ───────────────────────────────────────────────────────

/// A non-urgent incident submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub id:          Uuid,
  pub name:        Option<String>,
  pub location:    String,
  /// When the incident happened, as asserted by the reporter.
  pub datetime:    DateTime<Utc>,
  pub subject:     String,
  pub description: String,
  pub contact:     Option<String>,
  pub email:       Option<String>,
  pub file_ref:    Option<FileRef>,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

/// A time-critical SOS submission: location plus captured media only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyReport {
  pub id:         Uuid,
  pub file_ref:   FileRef,
  pub location:   String,
  pub created_at: DateTime<Utc>,
}

/// A general inquiry sent through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  pub id:         Uuid,
  pub name:       String,
  pub subject:    String,
  pub message:    String,
  pub email:      String,
  pub contact:    Option<String>,
  pub created_at: DateTime<Utc>,
}

// ─── Inputs to the store ─────────────────────────────────────────────────────

/// A validated report awaiting an id. `created_at` is set by the submission
/// service; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
  pub name:        Option<String>,
  pub location:    String,
  pub datetime:    DateTime<Utc>,
  pub subject:     String,
  pub description: String,
  pub contact:     Option<String>,
  pub email:       Option<String>,
  pub file_ref:    Option<FileRef>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmergencyReport {
  pub file_ref:   FileRef,
  pub location:   String,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContactMessage {
  pub name:       String,
  pub subject:    String,
  pub message:    String,
  pub email:      String,
  pub contact:    Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::insert`].
#[derive(Debug, Clone, PartialEq)]
pub enum NewRecord {
  Report(NewReport),
  Emergency(NewEmergencyReport),
  Contact(NewContactMessage),
}

impl NewRecord {
  pub fn kind(&self) -> RecordKind {
    match self {
      Self::Report(_) => RecordKind::Report,
      Self::Emergency(_) => RecordKind::Emergency,
      Self::Contact(_) => RecordKind::Contact,
    }
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    match self {
      Self::Report(r) => r.created_at,
      Self::Emergency(e) => e.created_at,
      Self::Contact(c) => c.created_at,
    }
  }
}
