//! Storage layer for listening history.
//!
//! Persists validated streaming entries using `rusqlite`. The store is a bulk
//! collaborator: the whole entry set is replaced on save and returned in full
//! on load. Aggregation always happens in memory from the loaded entries.
//!
//! # Thread Safety
//!
//! [`Store`] wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Use one store per thread or wrap it in a `Mutex`.
//!
//! # Schema
//!
//! Each entry is stored as its JSON serialization in `data`, next to the
//! normalized `ts` and `ms_played` columns. Row ids follow insertion order, so
//! loading returns entries in the order they were saved.
//!
//! The `metadata` table is a small key/value store holding the upload time
//! (`uploaded_at`, RFC 3339 UTC) and the entry count (`total_entries`).

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use lh_core::StreamingEntry;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Rows inserted per prepared-statement batch.
pub const SAVE_BATCH_SIZE: usize = 5_000;

const META_UPLOADED_AT: &str = "uploaded_at";
const META_TOTAL_ENTRIES: &str = "total_entries";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to serialize an entry.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A stored row could not be decoded back into an entry.
    #[error("invalid stored entry at row {row}: {message}")]
    InvalidEntry { row: i64, message: String },
    /// A metadata value had an unexpected format.
    #[error("invalid metadata {key}: {value}")]
    InvalidMetadata { key: String, value: String },
}

/// Upload bookkeeping written alongside the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub uploaded_at: DateTime<Utc>,
    pub total_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub entry_count: usize,
    pub metadata: Option<Metadata>,
}

/// Database connection wrapper.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens a database at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Opens an in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- ts: normalized UTC timestamp (e.g., '2024-01-15T10:30:00Z')
            -- data: JSON serialization of the full entry
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts TEXT NOT NULL,
                ms_played INTEGER NOT NULL,
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_ts ON entries(ts);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Replaces every stored entry and stamps the upload time as now.
    pub fn save_entries(&mut self, entries: &[StreamingEntry]) -> Result<usize, DbError> {
        self.save_entries_at(entries, Utc::now())
    }

    /// Replaces every stored entry in one transaction.
    pub fn save_entries_at(
        &mut self,
        entries: &[StreamingEntry],
        uploaded_at: DateTime<Utc>,
    ) -> Result<usize, DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        tx.execute("DELETE FROM metadata", [])?;

        let mut inserted = 0;
        {
            let mut stmt =
                tx.prepare("INSERT INTO entries (ts, ms_played, data) VALUES (?, ?, ?)")?;
            for batch in entries.chunks(SAVE_BATCH_SIZE) {
                for entry in batch {
                    let data = serde_json::to_string(entry)?;
                    inserted += stmt.execute(params![
                        entry.ts,
                        i64::try_from(entry.ms_played).unwrap_or(i64::MAX),
                        data
                    ])?;
                }
                tracing::debug!(rows = batch.len(), total = inserted, "saved entry batch");
            }

            let mut meta = tx.prepare("INSERT INTO metadata (key, value) VALUES (?, ?)")?;
            meta.execute(params![
                META_UPLOADED_AT,
                uploaded_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ])?;
            meta.execute(params![META_TOTAL_ENTRIES, inserted.to_string()])?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Loads every entry in insertion order.
    pub fn load_entries(&self) -> Result<Vec<StreamingEntry>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, data FROM entries ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        let mut entries = Vec::new();
        for row in rows {
            let (id, data) = row?;
            let entry = serde_json::from_str(&data).map_err(|e| DbError::InvalidEntry {
                row: id,
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// True when at least one entry is stored. Does not load entries.
    pub fn has_data(&self) -> Result<bool, DbError> {
        let exists: bool = self
            .conn
            .query_row("SELECT EXISTS(SELECT 1 FROM entries)", [], |row| row.get(0))?;
        Ok(exists)
    }

    /// Deletes every entry and the metadata.
    pub fn clear(&mut self) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        tx.execute("DELETE FROM metadata", [])?;
        tx.commit()?;
        Ok(())
    }

    fn meta_value(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM metadata WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Upload metadata, if anything has been saved.
    pub fn metadata(&self) -> Result<Option<Metadata>, DbError> {
        let (Some(uploaded_at), Some(total_entries)) = (
            self.meta_value(META_UPLOADED_AT)?,
            self.meta_value(META_TOTAL_ENTRIES)?,
        ) else {
            return Ok(None);
        };

        let invalid = |key: &str, value: &str| DbError::InvalidMetadata {
            key: key.to_string(),
            value: value.to_string(),
        };
        let uploaded = DateTime::parse_from_rfc3339(&uploaded_at)
            .map_err(|_| invalid(META_UPLOADED_AT, &uploaded_at))?
            .with_timezone(&Utc);
        let total = total_entries
            .parse()
            .map_err(|_| invalid(META_TOTAL_ENTRIES, &total_entries))?;
        Ok(Some(Metadata {
            uploaded_at: uploaded,
            total_entries: total,
        }))
    }

    pub fn stats(&self) -> Result<StoreStats, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(StoreStats {
            entry_count: usize::try_from(count).unwrap_or(0),
            metadata: self.metadata()?,
        })
    }
}
