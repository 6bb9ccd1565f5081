//! Checkpoint store trait and error types
//!
//! This module defines the interface every checkpoint backend implements and
//! the errors they report. A storage error is the one failure the harvester
//! does not recover from: it means progress can no longer be resumed.

use crate::model::ItemRecord;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint for '{key}' is corrupt: {message}")]
    Corrupt { key: String, message: String },

    #[error("Invalid checkpoint key: '{0}'")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What a store knows about one saved job, without its records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointSummary {
    /// The job key
    pub key: String,

    /// Number of records saved (the job's resume offset)
    pub records: usize,

    /// How many of those records are placeholders
    pub placeholders: usize,

    /// RFC 3339 timestamp of the last save, if known
    pub saved_at: Option<String>,
}

/// Trait for checkpoint backends
///
/// A checkpoint is the full list of records a content fetch job has produced
/// so far. Its length is the job's resume offset; no other bookkeeping is
/// kept.
pub trait CheckpointStore: Send {
    /// Loads the last saved records for `key`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(records))` - A checkpoint exists
    /// * `Ok(None)` - Nothing has been saved under this key
    /// * `Err(StorageError)` - The checkpoint exists but cannot be read
    fn load(&self, key: &str) -> StorageResult<Option<Vec<ItemRecord>>>;

    /// Replaces the checkpoint for `key` with `records`
    ///
    /// Always a full overwrite. A crash during a save must leave either the
    /// previous checkpoint or the new one, never a mix.
    fn save(&mut self, key: &str, records: &[ItemRecord]) -> StorageResult<()>;

    /// Removes the checkpoint for `key`; a missing checkpoint is not an error
    fn clear(&mut self, key: &str) -> StorageResult<()>;

    /// Lists all saved checkpoints, sorted by key
    fn list(&self) -> StorageResult<Vec<CheckpointSummary>>;
}

/// Rejects keys that cannot be used as a file stem
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0')
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
