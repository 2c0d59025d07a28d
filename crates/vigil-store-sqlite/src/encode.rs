//! Encoding and decoding helpers between Vigil records and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. File references are stored verbatim.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use vigil_core::record::{ContactMessage, EmergencyReport, FileRef, Report};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `reports` row.
pub struct RawReport {
  pub id:          String,
  pub name:        Option<String>,
  pub location:    String,
  pub datetime:    String,
  pub subject:     String,
  pub description: String,
  pub contact:     Option<String>,
  pub email:       Option<String>,
  pub file_ref:    Option<String>,
  pub created_at:  String,
}

impl RawReport {
  pub const COLUMNS: &'static str = "id, name, location, datetime, subject, \
     description, contact, email, file_ref, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      location:    row.get(2)?,
      datetime:    row.get(3)?,
      subject:     row.get(4)?,
      description: row.get(5)?,
      contact:     row.get(6)?,
      email:       row.get(7)?,
      file_ref:    row.get(8)?,
      created_at:  row.get(9)?,
    })
  }

  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      id:          decode_uuid(&self.id)?,
      name:        self.name,
      location:    self.location,
      datetime:    decode_dt(&self.datetime)?,
      subject:     self.subject,
      description: self.description,
      contact:     self.contact,
      email:       self.email,
      file_ref:    self.file_ref.map(FileRef::from_stored),
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `emergencies` row.
pub struct RawEmergency {
  pub id:         String,
  pub file_ref:   String,
  pub location:   String,
  pub created_at: String,
}

impl RawEmergency {
  pub const COLUMNS: &'static str = "id, file_ref, location, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      file_ref:   row.get(1)?,
      location:   row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_emergency(self) -> Result<EmergencyReport> {
    Ok(EmergencyReport {
      id:         decode_uuid(&self.id)?,
      file_ref:   FileRef::from_stored(self.file_ref),
      location:   self.location,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `contacts` row.
pub struct RawContact {
  pub id:         String,
  pub name:       String,
  pub subject:    String,
  pub message:    String,
  pub email:      String,
  pub contact:    Option<String>,
  pub created_at: String,
}

impl RawContact {
  pub const COLUMNS: &'static str =
    "id, name, subject, message, email, contact, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      subject:    row.get(2)?,
      message:    row.get(3)?,
      email:      row.get(4)?,
      contact:    row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_contact(self) -> Result<ContactMessage> {
    Ok(ContactMessage {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      subject:    self.subject,
      message:    self.message,
      email:      self.email,
      contact:    self.contact,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
