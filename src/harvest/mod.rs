//! Harvest module for listing walks and content fetches
//!
//! This module contains the core harvesting logic, including:
//! - HTTP transport with failure classification
//! - The single-retry policy shared by both phases
//! - Walking paginated listings
//! - Checkpointed, resumable content fetching
//! - Overall harvest coordination

mod content;
mod coordinator;
mod retry;
mod save_policy;
#[cfg(test)]
mod testing;
mod transport;
mod walker;

pub use content::{ContentFetcher, FetchOutcome, FetchSettings, FetchStop};
pub use coordinator::{plan_jobs, run_harvest, HarvestReport, Harvester, JobReport, PlannedJob};
pub use retry::{resolve, Attempt, FixedRetryPolicy, Resolution, RetryAction, RetryPolicy};
pub use save_policy::SavePolicy;
pub use transport::{build_http_client, HttpTransport, Transport};
pub use walker::{PageWalker, WalkOutcome, WalkSettings, WalkStop};
