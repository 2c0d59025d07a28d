//! SQL schema for the Vigil SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// All three tables are append-only: no UPDATE or DELETE is ever issued.
/// Listing relies on `rowid` order, which is insertion order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS reports (
    id           TEXT PRIMARY KEY,
    name         TEXT,
    location     TEXT NOT NULL,
    datetime     TEXT NOT NULL,   -- incident time asserted by the reporter
    subject      TEXT NOT NULL,
    description  TEXT NOT NULL,
    contact      TEXT,
    email        TEXT,
    file_ref     TEXT,            -- /uploads/<storage name>
    created_at   TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS emergencies (
    id           TEXT PRIMARY KEY,
    file_ref     TEXT NOT NULL,
    location     TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contacts (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    subject      TEXT NOT NULL,
    message      TEXT NOT NULL,
    email        TEXT NOT NULL,
    contact      TEXT,
    created_at   TEXT NOT NULL
);

PRAGMA user_version = 1;
";
