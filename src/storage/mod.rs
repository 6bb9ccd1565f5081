//! Checkpoint storage for resumable content fetches
//!
//! This module handles persisting the in-progress record list of each fetch
//! job, including:
//! - The `CheckpointStore` trait shared by all backends
//! - A JSON-file backend (one file per job)
//! - A SQLite backend (one database for all jobs)

mod file;
mod schema;
mod sqlite;
mod traits;

pub use file::FileCheckpointStore;
pub use sqlite::SqliteCheckpointStore;
pub use traits::{CheckpointStore, CheckpointSummary, StorageError, StorageResult};
pub(crate) use traits::validate_key;

use crate::config::{CheckpointBackend, CheckpointConfig};
use std::path::Path;

/// Opens the checkpoint store named by the configuration
///
/// # Arguments
///
/// * `config` - The checkpoint configuration
///
/// # Returns
///
/// * `Ok(Box<dyn CheckpointStore>)` - Store ready for use
/// * `Err(StorageError)` - The directory or database could not be opened
pub fn open_checkpoint_store(config: &CheckpointConfig) -> StorageResult<Box<dyn CheckpointStore>> {
    let path = Path::new(&config.path);
    let store: Box<dyn CheckpointStore> = match config.backend {
        CheckpointBackend::File => Box::new(FileCheckpointStore::new(path)?),
        CheckpointBackend::Sqlite => Box::new(SqliteCheckpointStore::new(path)?),
    };
    Ok(store)
}
