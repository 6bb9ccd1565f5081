//! JSON file checkpoint backend
//!
//! Each job is one file, `<dir>/<key>.json`. Saves write a sibling temporary
//! file, flush it to disk, and rename it over the destination, so a reader
//! only ever sees a complete checkpoint.

use crate::model::ItemRecord;
use crate::storage::traits::{
    validate_key, CheckpointStore, CheckpointSummary, StorageError, StorageResult,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// On-disk layout of one checkpoint file
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    job_key: String,
    saved_at: String,
    records: Vec<ItemRecord>,
}

/// Directory of JSON checkpoint files
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Opens a checkpoint directory, creating it if needed
    pub fn new(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Path of the checkpoint file for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, EXTENSION))
    }

    fn read_file(&self, key: &str) -> StorageResult<Option<CheckpointFile>> {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(file))
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<ItemRecord>>> {
        validate_key(key)?;
        Ok(self.read_file(key)?.map(|file| file.records))
    }

    fn save(&mut self, key: &str, records: &[ItemRecord]) -> StorageResult<()> {
        validate_key(key)?;

        let payload = serde_json::to_vec(&CheckpointFile {
            job_key: key.to_string(),
            saved_at: Utc::now().to_rfc3339(),
            records: records.to_vec(),
        })?;

        let destination = self.path_for(key);
        let staging = self.dir.join(format!("{}.{}.tmp", key, EXTENSION));

        {
            let mut file = File::create(&staging)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&staging, &destination)?;

        Ok(())
    }

    fn clear(&mut self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> StorageResult<Vec<CheckpointSummary>> {
        let mut summaries = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if let Some(file) = self.read_file(key)? {
                summaries.push(CheckpointSummary {
                    key: key.to_string(),
                    records: file.records.len(),
                    placeholders: file.records.iter().filter(|r| r.is_placeholder()).count(),
                    saved_at: Some(file.saved_at),
                });
            }
        }

        summaries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(summaries)
    }
}
