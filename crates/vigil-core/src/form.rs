//! Submission forms and their validation rules.
//!
//! The same rules run on the server before anything is written and in the
//! command-line client before anything is sent. A field that is absent, empty,
//! or only whitespace is "not present"; accepted values are trimmed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{NewContactMessage, NewReport};

// ─── Error ───────────────────────────────────────────────────────────────────

/// Every field that failed validation, collected in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("{}", describe(.missing, .invalid))]
pub struct ValidationError {
  /// Required fields that were absent or empty.
  pub missing: Vec<&'static str>,
  /// Fields that were present but could not be interpreted.
  pub invalid: Vec<&'static str>,
}

impl ValidationError {
  pub fn is_empty(&self) -> bool {
    self.missing.is_empty() && self.invalid.is_empty()
  }

  fn into_result(self) -> Result<(), Self> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

fn describe(missing: &[&str], invalid: &[&str]) -> String {
  match (missing.is_empty(), invalid.is_empty()) {
    (false, true) => format!("missing required fields: {}", missing.join(", ")),
    (true, false) => format!("invalid fields: {}", invalid.join(", ")),
    _ => format!(
      "missing required fields: {}; invalid fields: {}",
      missing.join(", "),
      invalid.join(", ")
    ),
  }
}

// ─── Field helpers ───────────────────────────────────────────────────────────

/// Trim `value`; `None` if nothing is left.
pub fn present(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn require(
  value: Option<String>,
  field: &'static str,
  errors: &mut ValidationError,
) -> Option<String> {
  let value = present(value);
  if value.is_none() {
    errors.missing.push(field);
  }
  value
}

/// Parse a user-supplied incident time.
///
/// Accepts RFC 3339, the `YYYY-MM-DDTHH:MM[:SS]` shape produced by browser
/// `datetime-local` inputs (taken as UTC), and a bare `YYYY-MM-DD` (midnight
/// UTC).
pub fn parse_incident_time(raw: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
      return Some(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Raw fields of an incident report as received from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportForm {
  pub name:        Option<String>,
  pub location:    Option<String>,
  pub datetime:    Option<String>,
  pub subject:     Option<String>,
  pub description: Option<String>,
  pub contact:     Option<String>,
  pub email:       Option<String>,
}

impl ReportForm {
  /// Check required fields and normalise. The returned record has no file
  /// reference yet; `received_at` becomes its `created_at`.
  pub fn validate(
    self,
    received_at: DateTime<Utc>,
  ) -> Result<NewReport, ValidationError> {
    let mut errors = ValidationError::default();

    let location    = require(self.location, "location", &mut errors);
    let datetime    = require(self.datetime, "datetime", &mut errors);
    let subject     = require(self.subject, "subject", &mut errors);
    let description = require(self.description, "description", &mut errors);

    let parsed = datetime.as_deref().and_then(parse_incident_time);
    if datetime.is_some() && parsed.is_none() {
      errors.invalid.push("datetime");
    }

    errors.into_result()?;

    match (location, parsed, subject, description) {
      (Some(location), Some(datetime), Some(subject), Some(description)) => {
        Ok(NewReport {
          name: present(self.name),
          location,
          datetime,
          subject,
          description,
          contact: present(self.contact),
          email: present(self.email),
          file_ref: None,
          created_at: received_at,
        })
      }
      // Unreachable: every `None` above recorded an error.
      _ => Err(ValidationError::default()),
    }
  }
}

// ─── Emergency ───────────────────────────────────────────────────────────────

/// Raw fields of an SOS submission. The captured media travels separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyForm {
  pub location: Option<String>,
}

impl EmergencyForm {
  /// Both the location and the attachment are required. Returns the trimmed
  /// location.
  pub fn validate(self, has_file: bool) -> Result<String, ValidationError> {
    let mut errors = ValidationError::default();
    let location = require(self.location, "location", &mut errors);
    if !has_file {
      errors.missing.push("file");
    }
    errors.into_result()?;
    location.ok_or_else(ValidationError::default)
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// Raw fields of a contact-form message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
  pub name:    Option<String>,
  pub subject: Option<String>,
  pub message: Option<String>,
  pub email:   Option<String>,
  pub contact: Option<String>,
}

impl ContactForm {
  pub fn validate(
    self,
    received_at: DateTime<Utc>,
  ) -> Result<NewContactMessage, ValidationError> {
    let mut errors = ValidationError::default();

    let name    = require(self.name, "name", &mut errors);
    let subject = require(self.subject, "subject", &mut errors);
    let message = require(self.message, "message", &mut errors);
    let email   = require(self.email, "email", &mut errors);

    errors.into_result()?;

    match (name, subject, message, email) {
      (Some(name), Some(subject), Some(message), Some(email)) => {
        Ok(NewContactMessage {
          name,
          subject,
          message,
          email,
          contact: present(self.contact),
          created_at: received_at,
        })
      }
      _ => Err(ValidationError::default()),
    }
  }
}
