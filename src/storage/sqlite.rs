//! SQLite checkpoint backend
//!
//! All jobs share one database. A save replaces a job's rows inside a single
//! transaction, so a crash mid-save rolls back to the previous checkpoint.

use crate::model::ItemRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    validate_key, CheckpointStore, CheckpointSummary, StorageError, StorageResult,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteCheckpointStore {
    conn: Connection,
}

impl SqliteCheckpointStore {
    /// Opens or creates a checkpoint database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCheckpointStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl CheckpointStore for SqliteCheckpointStore {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<ItemRecord>>> {
        let expected: Option<i64> = self
            .conn
            .query_row(
                "SELECT record_count FROM jobs WHERE job_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(expected) = expected else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT record FROM checkpoint_records WHERE job_key = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            let json = row?;
            let record = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                message: format!("record {}: {}", records.len(), e),
            })?;
            records.push(record);
        }

        if records.len() as i64 != expected {
            return Err(StorageError::Corrupt {
                key: key.to_string(),
                message: format!("expected {} records, found {}", expected, records.len()),
            });
        }

        Ok(Some(records))
    }

    fn save(&mut self, key: &str, records: &[ItemRecord]) -> StorageResult<()> {
        validate_key(key)?;
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO jobs (job_key, record_count, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(job_key) DO UPDATE SET record_count = excluded.record_count,
                                                saved_at = excluded.saved_at",
            params![key, records.len() as i64, now],
        )?;
        tx.execute("DELETE FROM checkpoint_records WHERE job_key = ?1", params![key])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO checkpoint_records (job_key, position, placeholder, record)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, record) in records.iter().enumerate() {
                let json = serde_json::to_string(record)?;
                insert.execute(params![
                    key,
                    position as i64,
                    record.is_placeholder(),
                    json
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn clear(&mut self, key: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM checkpoint_records WHERE job_key = ?1", params![key])?;
        tx.execute("DELETE FROM jobs WHERE job_key = ?1", params![key])?;
        tx.commit()?;
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<CheckpointSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT j.job_key, j.record_count, j.saved_at,
                    (SELECT COUNT(*) FROM checkpoint_records r
                     WHERE r.job_key = j.job_key AND r.placeholder = 1)
             FROM jobs j ORDER BY j.job_key",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CheckpointSummary {
                key: row.get(0)?,
                records: row.get::<_, i64>(1)? as usize,
                saved_at: row.get(2)?,
                placeholders: row.get::<_, i64>(3)? as usize,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }

        Ok(summaries)
    }
}
