//! The storage traits: [`RecordStore`] for records and [`AttachmentStore`]
//! for uploaded files.
//!
//! Implemented by backends (`vigil-store-sqlite`, `vigil-files`). The
//! services and the HTTP layer depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  attachment::Upload,
  record::{ContactMessage, EmergencyReport, FileRef, NewRecord, RecordKind, Report},
};

// ─── Records ─────────────────────────────────────────────────────────────────

/// Abstraction over the document persistence layer.
///
/// Every collection is append-only. Each insert is atomic and durable before
/// its future resolves. Reads return records in insertion order.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a record and return its system-assigned id.
  fn insert(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// All reports, oldest first.
  fn find_reports(
    &self,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;

  /// All emergency reports, oldest first.
  fn find_emergencies(
    &self,
  ) -> impl Future<Output = Result<Vec<EmergencyReport>, Self::Error>> + Send + '_;

  /// All contact messages, oldest first.
  fn find_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactMessage>, Self::Error>> + Send + '_;

  /// Number of records of `kind`.
  fn count(
    &self,
    kind: RecordKind,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}

// ─── Attachments ─────────────────────────────────────────────────────────────

/// Abstraction over the file intake.
///
/// The error type converts into [`crate::Error`] so that a rejected media type
/// reaches the caller as [`crate::Error::UnsupportedMediaType`] and everything
/// else as [`crate::Error::Storage`].
pub trait AttachmentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Check the upload's media type, write it under a fresh storage name and
  /// return a reference suitable for static serving.
  fn store(
    &self,
    upload: Upload,
  ) -> impl Future<Output = Result<FileRef, Self::Error>> + Send + '_;
}
