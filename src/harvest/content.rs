//! Content fetcher: one record per listing entry, checkpointed and resumable
//!
//! The fetcher's progress lives entirely in its checkpoint. A run loads the
//! job's saved records, resumes at index `records.len()`, and saves the whole
//! list whenever the [`SavePolicy`] says so and once more before returning.

use crate::clock::Clock;
use crate::config::{CheckpointConfig, PacingConfig};
use crate::harvest::retry::{resolve, Resolution, RetryPolicy};
use crate::harvest::save_policy::SavePolicy;
use crate::harvest::transport::Transport;
use crate::model::{Document, ItemRecord, ListingEntry};
use crate::storage::{CheckpointStore, StorageError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pacing and checkpoint settings for a fetch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Courtesy pause after every detail request
    pub item_delay: Duration,

    pub save_policy: SavePolicy,
}

impl FetchSettings {
    pub fn from_config(pacing: &PacingConfig, checkpoint: &CheckpointConfig) -> Self {
        Self {
            item_delay: pacing.item_delay(),
            save_policy: SavePolicy::from_config(checkpoint),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            item_delay: PacingConfig::default().item_delay(),
            save_policy: SavePolicy::default(),
        }
    }
}

/// Why a fetch run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStop {
    /// Every input has a record
    Completed,

    /// The API answered 429 at input `index`; that input and everything after
    /// it are left for the next run
    RateLimited { index: usize },
}

/// Result of a fetch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// All records for the job, including those loaded from the checkpoint
    pub records: Vec<ItemRecord>,

    /// Index the run started at
    pub resumed_from: usize,

    /// Detail requests issued by this run, retries included
    pub requests: usize,

    pub stop: FetchStop,
}

impl FetchOutcome {
    pub fn placeholders(&self) -> usize {
        self.records.iter().filter(|r| r.is_placeholder()).count()
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self.stop, FetchStop::RateLimited { .. })
    }
}

/// Fetches detail documents for a job's listing entries
pub struct ContentFetcher<'a> {
    transport: &'a dyn Transport,
    policy: &'a dyn RetryPolicy,
    clock: &'a dyn Clock,
    settings: FetchSettings,
}

impl<'a> ContentFetcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        policy: &'a dyn RetryPolicy,
        clock: &'a dyn Clock,
        settings: FetchSettings,
    ) -> Self {
        Self {
            transport,
            policy,
            clock,
            settings,
        }
    }

    /// Produces one record per entry, resuming from the checkpoint under `key`
    ///
    /// Resumption is positional: the first `records.len()` entries are taken as
    /// done. If this listing has a different number of degraded slots before
    /// that point than the run that wrote the checkpoint, entries are skipped
    /// or fetched twice; `--fresh` starts the job over.
    ///
    /// # Arguments
    ///
    /// * `store` - Checkpoint store holding the job's progress
    /// * `key` - Checkpoint key of the job
    /// * `name` - Job name stamped on every fetched document
    /// * `entries` - The job's inputs, in order
    ///
    /// # Returns
    ///
    /// * `Ok(FetchOutcome)` - The run finished or stopped on a rate limit;
    ///   either way the returned records were saved
    /// * `Err(StorageError)` - The checkpoint could not be read or written
    pub async fn fetch(
        &self,
        store: &mut dyn CheckpointStore,
        key: &str,
        name: Option<&str>,
        entries: &[ListingEntry],
    ) -> Result<FetchOutcome, StorageError> {
        let total = entries.len();
        let mut records = match store.load(key)? {
            Some(records) => {
                info!(
                    "Resuming from checkpoint: {}/{} already done.",
                    records.len(),
                    total
                );
                records
            }
            None => {
                info!("No checkpoint found; starting from scratch.");
                Vec::new()
            }
        };
        let resumed_from = records.len();
        if resumed_from > total {
            warn!(
                "Checkpoint '{}' holds {} records but only {} inputs were given",
                key, resumed_from, total
            );
        }

        let mut requests = 0usize;
        let mut stop = FetchStop::Completed;
        let mut since_save = 0usize;
        let mut last_save = self.clock.now();

        for (index, entry) in entries.iter().enumerate().skip(resumed_from) {
            let record = match entry {
                ListingEntry::Id(url) => {
                    info!("[{}/{}] Downloading {}", index + 1, total, url);
                    match self.fetch_document(url, name, &mut requests).await {
                        Some(record) => record,
                        None => {
                            warn!("429 Too Many Requests; stopping early at {}", index + 1);
                            stop = FetchStop::RateLimited { index };
                            break;
                        }
                    }
                }
                ListingEntry::Recovered { full_text } => {
                    debug!("[{}/{}] Using text recovered during listing", index + 1, total);
                    ItemRecord::Document(Document::recovered(full_text.clone(), name))
                }
                ListingEntry::Missing => {
                    debug!("[{}/{}] Listing slot is missing", index + 1, total);
                    ItemRecord::Placeholder
                }
            };

            records.push(record);
            since_save += 1;

            if entry.id().is_some() {
                self.clock.sleep(self.settings.item_delay).await;
            }

            let now = self.clock.now();
            if self
                .settings
                .save_policy
                .should_save(since_save, now.duration_since(last_save))
            {
                store.save(key, &records)?;
                info!("Checkpoint saved at index {}.", index + 1);
                since_save = 0;
                last_save = now;
            }
        }

        store.save(key, &records)?;
        info!("Final checkpoint written ({} records).", records.len());

        Ok(FetchOutcome {
            records,
            resumed_from,
            requests,
            stop,
        })
    }

    /// Fetches one detail document; `None` means the run must stop
    async fn fetch_document(
        &self,
        url: &str,
        name: Option<&str>,
        requests: &mut usize,
    ) -> Option<ItemRecord> {
        let transport = self.transport;
        let resolution = resolve(self.policy, self.clock, |_| async move {
            let body = transport.get_json(url, &[("fo", "json")]).await?;
            Document::from_detail(url, &body, name)
        })
        .await;
        *requests += match resolution {
            Resolution::Retried(_) | Resolution::RetryFailed(_) => 2,
            _ => 1,
        };

        match resolution {
            Resolution::Fresh(doc) => Some(doc.into()),
            Resolution::Retried(doc) => {
                info!("Recovered {} on retry", url);
                Some(doc.into())
            }
            Resolution::RetryFailed(error) => {
                warn!("Retry failed: {}. Recording a placeholder.", error);
                Some(ItemRecord::Placeholder)
            }
            Resolution::Skipped(error) => {
                warn!("{}; skipping.", error);
                Some(ItemRecord::Placeholder)
            }
            Resolution::Aborted(error) => {
                debug!("Aborting fetch: {}", error);
                None
            }
        }
    }
}
