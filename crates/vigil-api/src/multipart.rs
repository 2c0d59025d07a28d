//! Splitting a `multipart/form-data` body into text fields and the optional
//! `file` attachment.

use std::collections::HashMap;

use axum::extract::{Multipart, multipart::MultipartRejection};
use vigil_core::{
  attachment::Upload,
  form::{EmergencyForm, ReportForm},
};

use crate::error::{ApiError, Result};

/// Name of the form part that carries the attachment.
pub const FILE_FIELD: &str = "file";

/// A decoded multipart submission.
#[derive(Debug, Default)]
pub struct FormParts {
  pub fields: HashMap<String, String>,
  pub file:   Option<Upload>,
}

impl FormParts {
  /// Drain every part of `multipart`.
  ///
  /// A `file` part with no file name and no content is what browsers send
  /// for an untouched file input; it counts as no attachment. Later text
  /// fields with a repeated name win.
  pub async fn read(
    multipart: std::result::Result<Multipart, MultipartRejection>,
  ) -> Result<Self> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut parts = Self::default();

    while let Some(field) = multipart.next_field().await? {
      let name = field.name().unwrap_or_default().to_owned();
      if name == FILE_FIELD {
        let original_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;
        if original_name.is_empty() && bytes.is_empty() {
          continue;
        }
        parts.file = Some(Upload::new(original_name, content_type, bytes));
      } else if !name.is_empty() {
        let value = field.text().await?;
        parts.fields.insert(name, value);
      }
    }

    Ok(parts)
  }

  pub fn take(&mut self, field: &str) -> Option<String> { self.fields.remove(field) }

  pub fn report_form(&mut self) -> ReportForm {
    ReportForm {
      name:        self.take("name"),
      location:    self.take("location"),
      datetime:    self.take("datetime"),
      subject:     self.take("subject"),
      description: self.take("description"),
      contact:     self.take("contact"),
      email:       self.take("email"),
    }
  }

  pub fn emergency_form(&mut self) -> EmergencyForm {
    EmergencyForm { location: self.take("location") }
  }
}
