//! When the content fetcher writes a checkpoint

use crate::config::CheckpointConfig;
use std::time::Duration;

/// Two independent save triggers, combined with OR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavePolicy {
    every_records: usize,
    every_interval: Duration,
}

impl SavePolicy {
    pub fn new(every_records: usize, every_interval: Duration) -> Self {
        Self {
            every_records: every_records.max(1),
            every_interval,
        }
    }

    pub fn from_config(config: &CheckpointConfig) -> Self {
        Self::new(config.save_every_records, config.save_interval())
    }

    /// Enough records have been appended since the last save
    pub fn count_due(&self, appended_since_save: usize) -> bool {
        appended_since_save >= self.every_records
    }

    /// Enough time has passed since the last save
    pub fn time_due(&self, since_last_save: Duration) -> bool {
        since_last_save >= self.every_interval
    }

    pub fn should_save(&self, appended_since_save: usize, since_last_save: Duration) -> bool {
        self.count_due(appended_since_save) || self.time_due(since_last_save)
    }
}

impl Default for SavePolicy {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(600))
    }
}
