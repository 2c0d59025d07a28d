//! Local filesystem file intake for Vigil submissions.
//!
//! Attachments are written flat into a single uploads directory under a
//! generated storage name and served back from `/uploads/<storage name>`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use uuid::Uuid;
use vigil_core::{attachment::Upload, record::FileRef, store::AttachmentStore};

pub mod error;

pub use error::{Error, Result};

/// Stores attachments in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalAttachmentStore {
  /// Directory that holds every stored attachment (e.g. `./uploads`).
  root_path: PathBuf,
}

impl LocalAttachmentStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root_path: root.into() }
  }

  pub fn root(&self) -> &Path { &self.root_path }

  /// Map a reference back to the file it names, if it points directly into
  /// the uploads directory.
  pub fn resolve(&self, file_ref: &FileRef) -> Option<PathBuf> {
    file_ref.storage_name().map(|name| self.root_path.join(name))
  }
}

impl AttachmentStore for LocalAttachmentStore {
  type Error = Error;

  async fn store(&self, upload: Upload) -> Result<FileRef> {
    let Some(media_type) = upload.media_type() else {
      let declared = upload.content_type.unwrap_or_else(|| "unknown".to_owned());
      return Err(Error::Unsupported(declared));
    };

    let name = storage_name(Utc::now().timestamp_millis(), Uuid::new_v4(), &upload.original_name);

    fs::create_dir_all(&self.root_path).await?;
    fs::write(self.root_path.join(&name), &upload.bytes).await?;

    tracing::debug!(%media_type, storage_name = %name, bytes = upload.bytes.len(), "stored attachment");
    Ok(FileRef::for_storage_name(&name))
  }
}

/// `<unix-millis>-<8 hex>-<sanitized original name>`.
fn storage_name(millis: i64, nonce: Uuid, original: &str) -> String {
  let hex = nonce.simple().to_string();
  format!("{millis}-{}-{}", &hex[..8], sanitize(original))
}

/// Keep ASCII alphanumerics and `.-_`; replace everything else with `_`.
fn sanitize(original: &str) -> String {
  // Browsers may send a full client path; only the last segment matters.
  let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
  let cleaned: String = base
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
    .collect();
  if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
    "upload".to_owned()
  } else {
    cleaned
  }
}
