//! Storage layer for devshelf records.
//!
//! Records are kept as JSON documents in SQLite, one table per collection:
//!
//! - `id` - the record identifier (hyphenated UUID v4)
//! - `unique_key` - the value of the kind's unique field, `NULL` for kinds without one
//! - `body` - the entity fields as JSON
//! - `created_at` / `updated_at` - RFC 3339 timestamps with microsecond precision
//!
//! Uniqueness is enforced by a `UNIQUE` index on `unique_key`, so a violating
//! insert or update fails as a single statement and leaves nothing behind.
//! The [`connector`] module owns the process-wide handle to a `Storage`.

pub mod connector;

pub use connector::{Connector, DATABASE_URL_ENV, DatabaseUrl, Handle};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::models::{Document, EntityKind, Record};
use crate::{Error, Result};

/// A database row before its body and timestamps are decoded.
struct RawRow {
    id: String,
    body: String,
    created_at: String,
    updated_at: String,
}

/// Document store over a single SQLite connection.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (creating if needed) the store at the given location.
    pub fn open(url: &DatabaseUrl) -> Result<Self> {
        let conn = match url {
            DatabaseUrl::Memory => Connection::open_in_memory()?,
            DatabaseUrl::File(path) => Connection::open(path)?,
        };
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create one table per collection.
    fn init_schema(conn: &Connection) -> Result<()> {
        for kind in EntityKind::ALL {
            let table = kind.collection();
            conn.execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    unique_key TEXT UNIQUE,
                    body TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_{table}_created_at ON {table}(created_at);
                "#
            ))?;
        }
        Ok(())
    }

    /// List every record of a kind, newest first.
    ///
    /// Records created within the same microsecond keep insertion order
    /// (newest first) through the `seq` tiebreaker.
    pub fn list<D: Document>(&self) -> Result<Vec<Record<D>>> {
        let sql = format!(
            "SELECT id, body, created_at, updated_at FROM {} ORDER BY created_at DESC, seq DESC",
            D::KIND.collection()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    body: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(decode).collect()
    }

    /// Number of records of a kind.
    pub fn count<D: Document>(&self) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", D::KIND.collection());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get a record by ID.
    pub fn get<D: Document>(&self, id: &str) -> Result<Record<D>> {
        let id = parse_id(id)?;
        let sql = format!(
            "SELECT id, body, created_at, updated_at FROM {} WHERE id = ?1",
            D::KIND.collection()
        );
        let raw = self
            .conn
            .query_row(&sql, [&id], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    body: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })
            .optional()?
            .ok_or(Error::NotFound(D::KIND))?;

        decode(raw)
    }

    /// Insert a new record, assigning its ID and timestamps.
    pub fn insert<D: Document>(&mut self, doc: D) -> Result<Record<D>> {
        let id = Uuid::new_v4().to_string();
        let now = now();
        let sql = format!(
            "INSERT INTO {} (id, unique_key, body, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            D::KIND.collection()
        );
        self.conn
            .execute(
                &sql,
                params![id, doc.unique_key(), serde_json::to_string(&doc)?, encode_time(&now)],
            )
            .map_err(classify::<D>)?;

        Ok(Record {
            id,
            doc,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace every field of an existing record.
    ///
    /// `updated_at` never moves backwards, even if the clock does.
    pub fn replace<D: Document>(&mut self, id: &str, doc: D) -> Result<Record<D>> {
        let id = parse_id(id)?;
        let table = D::KIND.collection();
        let tx = self.conn.transaction()?;

        let existing: Option<(String, String)> = tx
            .query_row(
                &format!("SELECT created_at, updated_at FROM {table} WHERE id = ?1"),
                [&id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (created_at, previous) = existing.ok_or(Error::NotFound(D::KIND))?;
        let created_at = decode_time(&created_at)?;
        let updated_at = now().max(decode_time(&previous)?);

        tx.execute(
            &format!("UPDATE {table} SET unique_key = ?1, body = ?2, updated_at = ?3 WHERE id = ?4"),
            params![
                doc.unique_key(),
                serde_json::to_string(&doc)?,
                encode_time(&updated_at),
                id
            ],
        )
        .map_err(classify::<D>)?;
        tx.commit()?;

        Ok(Record {
            id,
            doc,
            created_at,
            updated_at,
        })
    }

    /// Delete a record by ID.
    pub fn delete<D: Document>(&mut self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", D::KIND.collection());
        let removed = self.conn.execute(&sql, [&id])?;
        if removed == 0 {
            return Err(Error::NotFound(D::KIND));
        }
        Ok(())
    }
}

/// Normalize a record ID, rejecting anything that is not a UUID.
pub fn parse_id(id: &str) -> Result<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| Error::InvalidId(id.to_string()))
}

/// Whether a SQLite error is a unique-index violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn classify<D: Document>(err: rusqlite::Error) -> Error {
    if is_unique_violation(&err) {
        Error::Duplicate(D::KIND)
    } else {
        Error::Database(err)
    }
}

/// Current time at the precision the store keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn encode_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("Corrupt timestamp '{}': {}", raw, e)))
}

fn decode<D: Document>(raw: RawRow) -> Result<Record<D>> {
    Ok(Record {
        doc: serde_json::from_str(&raw.body)?,
        created_at: decode_time(&raw.created_at)?,
        updated_at: decode_time(&raw.updated_at)?,
        id: raw.id,
    })
}
