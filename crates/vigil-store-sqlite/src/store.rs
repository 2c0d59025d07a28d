//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use uuid::Uuid;
use vigil_core::{
  record::{
    ContactMessage, EmergencyReport, NewContactMessage, NewEmergencyReport,
    NewRecord, NewReport, RecordKind, Report,
  },
  store::RecordStore,
};

use crate::{
  encode::{encode_dt, encode_uuid, RawContact, RawEmergency, RawReport},
  schema::SCHEMA,
  Result,
};

fn table(kind: RecordKind) -> &'static str {
  match kind {
    RecordKind::Report => "reports",
    RecordKind::Emergency => "emergencies",
    RecordKind::Contact => "contacts",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vigil record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  ///
  /// The path `:memory:` opens a private in-memory database.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing anything still pending.
  ///
  /// Fails if other clones of this store are still alive.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::debug!("record store closed");
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_report(&self, id: Uuid, r: NewReport) -> Result<()> {
    let id_str       = encode_uuid(id);
    let datetime_str = encode_dt(r.datetime);
    let created_str  = encode_dt(r.created_at);
    let file_ref     = r.file_ref.map(|f| f.as_str().to_owned());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (
             id, name, location, datetime, subject, description,
             contact, email, file_ref, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            r.name,
            r.location,
            datetime_str,
            r.subject,
            r.description,
            r.contact,
            r.email,
            file_ref,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_emergency(&self, id: Uuid, e: NewEmergencyReport) -> Result<()> {
    let id_str      = encode_uuid(id);
    let file_ref    = e.file_ref.as_str().to_owned();
    let created_str = encode_dt(e.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO emergencies (id, file_ref, location, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, file_ref, e.location, created_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert_contact(&self, id: Uuid, c: NewContactMessage) -> Result<()> {
    let id_str      = encode_uuid(id);
    let created_str = encode_dt(c.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             id, name, subject, message, email, contact, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            c.name,
            c.subject,
            c.message,
            c.email,
            c.contact,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, record: NewRecord) -> Result<Uuid> {
    let id = Uuid::new_v4();
    match record {
      NewRecord::Report(r) => self.insert_report(id, r).await?,
      NewRecord::Emergency(e) => self.insert_emergency(id, e).await?,
      NewRecord::Contact(c) => self.insert_contact(id, c).await?,
    }
    Ok(id)
  }

  async fn find_reports(&self) -> Result<Vec<Report>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM reports ORDER BY rowid", RawReport::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }

  async fn find_emergencies(&self) -> Result<Vec<EmergencyReport>> {
    let raws: Vec<RawEmergency> = self
      .conn
      .call(|conn| {
        let sql =
          format!("SELECT {} FROM emergencies ORDER BY rowid", RawEmergency::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawEmergency::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmergency::into_emergency).collect()
  }

  async fn find_contacts(&self) -> Result<Vec<ContactMessage>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM contacts ORDER BY rowid", RawContact::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn count(&self, kind: RecordKind) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table(kind));
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }
}
