//! Harvest coordinator - runs one walk-then-fetch job per candidate
//!
//! For every candidate row the coordinator:
//! - Builds the search URL and derives the job key
//! - Walks the listing to collect item identifiers
//! - Fetches every item through the checkpointed content fetcher
//!
//! A rate limit ends only the job it happened in. Later jobs still run, and a
//! later invocation resumes the cut-short job from its checkpoint.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::harvest::content::{ContentFetcher, FetchOutcome, FetchSettings};
use crate::harvest::retry::FixedRetryPolicy;
use crate::harvest::transport::{build_http_client, HttpTransport, Transport};
use crate::harvest::walker::{PageWalker, WalkSettings, WalkStop};
use crate::model::ItemRecord;
use crate::output::{flatten_records, write_table, HarvestSummary};
use crate::query::{build_search_url, derive_job_key, JobKey};
use crate::storage::{open_checkpoint_store, CheckpointStore};
use crate::{ConfigError, HarvestError};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// A candidate row resolved to its search URL and job key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJob {
    pub year: i32,
    pub url: Url,

    /// `None` when the URL does not yield a key; such jobs are skipped
    pub key: Option<JobKey>,
}

/// What one job produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub key: JobKey,
    pub year: i32,

    /// Entries the walker collected, degraded ones included
    pub listed: usize,

    /// Why the walk ended
    pub walk: WalkStop,

    pub fetch: FetchOutcome,
}

impl JobReport {
    /// The job stopped early on a rate limit, in either phase
    pub fn rate_limited(&self) -> bool {
        matches!(self.walk, WalkStop::RateLimited { .. }) || self.fetch.is_rate_limited()
    }
}

/// Results of a whole harvest, in candidate order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub jobs: Vec<JobReport>,

    /// Candidates skipped because no job key could be derived
    pub skipped: usize,
}

impl HarvestReport {
    /// All records, job after job
    pub fn records(&self) -> Vec<ItemRecord> {
        flatten_records(self.jobs.iter().map(|job| job.fetch.records.as_slice()))
    }
}

/// Main harvest coordinator structure
pub struct Harvester {
    config: Config,
    transport: Box<dyn Transport>,
    store: Box<dyn CheckpointStore>,
    clock: Arc<dyn Clock>,
    policy: FixedRetryPolicy,
}

impl Harvester {
    /// Creates a harvester with an HTTP transport and the configured store
    ///
    /// # Arguments
    ///
    /// * `config` - The validated harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or checkpoint store failed to open
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent, &config.api)?;
        let store = open_checkpoint_store(&config.checkpoint)?;

        Ok(Self::with_parts(
            config,
            Box::new(HttpTransport::new(client)),
            store,
            Arc::new(SystemClock),
        ))
    }

    /// Creates a harvester from explicit collaborators
    pub fn with_parts(
        config: Config,
        transport: Box<dyn Transport>,
        store: Box<dyn CheckpointStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = FixedRetryPolicy::new(config.pacing.retry_delay());
        Self {
            config,
            transport,
            store,
            clock,
            policy,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn CheckpointStore {
        self.store.as_ref()
    }

    /// Resolves every candidate row without touching the network
    pub fn plan(&self) -> Result<Vec<PlannedJob>, ConfigError> {
        plan_jobs(&self.config)
    }

    /// Runs every planned job in order
    ///
    /// # Arguments
    ///
    /// * `fresh` - Clear each job's checkpoint before fetching
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - All jobs ran; some may have stopped on a rate limit
    /// * `Err(HarvestError)` - A search URL could not be built or a checkpoint
    ///   could not be read or written
    pub async fn run(&mut self, fresh: bool) -> Result<HarvestReport, HarvestError> {
        let plan = self.plan()?;
        let total = plan.len();
        let mut report = HarvestReport::default();

        let walk_settings = WalkSettings::from_config(&self.config.api, &self.config.pacing);
        let fetch_settings = FetchSettings::from_config(&self.config.pacing, &self.config.checkpoint);

        for (n, job) in plan.into_iter().enumerate() {
            let key = match job.key {
                Some(key) => key,
                None => {
                    warn!("Could not derive a job key from {}; skipping", job.url);
                    report.skipped += 1;
                    continue;
                }
            };
            info!("Job {}/{}: {} ({})", n + 1, total, key, job.year);

            if fresh {
                self.store.clear(&key.stem)?;
            }

            let walker = PageWalker::new(
                self.transport.as_ref(),
                &self.policy,
                self.clock.as_ref(),
                walk_settings.clone(),
            );
            let walk = walker.walk(job.url.as_str()).await;
            info!(
                "Listing for {} yielded {} identifiers over {} pages",
                key,
                walk.id_count(),
                walk.pages
            );
            let degraded = walk.degraded_count();
            if degraded > 0 {
                warn!("{} listing slots for {} stand in for failed pages", degraded, key);
            }

            let fetcher = ContentFetcher::new(
                self.transport.as_ref(),
                &self.policy,
                self.clock.as_ref(),
                fetch_settings,
            );
            let fetch = fetcher
                .fetch(self.store.as_mut(), &key.stem, Some(&key.name), &walk.entries)
                .await?;

            let job_report = JobReport {
                year: job.year,
                listed: walk.entries.len(),
                walk: walk.stop,
                fetch,
                key,
            };
            if job_report.rate_limited() {
                warn!(
                    "Job {} stopped on a rate limit; rerun later to resume it",
                    job_report.key
                );
            }
            report.jobs.push(job_report);
        }

        Ok(report)
    }
}

/// Resolves every candidate row to its search URL and job key
pub fn plan_jobs(config: &Config) -> Result<Vec<PlannedJob>, ConfigError> {
    config
        .candidates
        .iter()
        .map(|candidate| {
            let url = build_search_url(candidate, &config.search)?;
            let key = derive_job_key(&url);
            Ok(PlannedJob {
                year: candidate.year,
                url,
                key,
            })
        })
        .collect()
}

/// Runs a complete harvest and writes the output table
///
/// # Example
///
/// ```no_run
/// use loc_harvest::config::load_config;
/// use loc_harvest::harvest::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_harvest(config, false).await?;
/// println!("{} records", summary.total_records());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config, fresh: bool) -> crate::Result<HarvestSummary> {
    let table_path = config.output.table_path.clone();
    let mut harvester = Harvester::new(config)?;
    let report = harvester.run(fresh).await?;

    let records = report.records();
    write_table(&records, Path::new(&table_path))?;
    info!("Wrote {} rows to {}", records.len(), table_path);

    Ok(HarvestSummary::from_report(&report))
}
