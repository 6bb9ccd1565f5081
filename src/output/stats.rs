//! Harvest and checkpoint statistics
//!
//! This module summarizes a finished harvest per job and lists what the
//! checkpoint store holds.

use crate::harvest::{FetchStop, HarvestReport, WalkStop};
use crate::storage::CheckpointSummary;

/// Per-job counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    /// Checkpoint key of the job
    pub key: String,

    pub year: i32,

    /// Entries collected by the listing walk
    pub listed: usize,

    /// Records held after this run, resumed ones included
    pub records: usize,

    /// Records with a fetched document
    pub documents: usize,

    /// Missing-value records
    pub placeholders: usize,

    /// Records carried over from an earlier run
    pub resumed: usize,

    /// Whether the job stopped early on HTTP 429
    pub rate_limited: bool,

    /// How the listing walk ended
    pub listing: &'static str,

    /// How the content fetch ended
    pub fetch: &'static str,
}

/// Harvest summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub jobs: Vec<JobSummary>,

    /// Candidates skipped for want of a job key
    pub skipped: usize,
}

impl HarvestSummary {
    pub fn from_report(report: &HarvestReport) -> Self {
        let jobs = report
            .jobs
            .iter()
            .map(|job| {
                let records = job.fetch.records.len();
                let placeholders = job.fetch.placeholders();
                JobSummary {
                    key: job.key.stem.clone(),
                    year: job.year,
                    listed: job.listed,
                    records,
                    documents: records - placeholders,
                    placeholders,
                    resumed: job.fetch.resumed_from.min(records),
                    rate_limited: job.rate_limited(),
                    listing: walk_stop_label(&job.walk),
                    fetch: fetch_stop_label(&job.fetch.stop),
                }
            })
            .collect();

        Self {
            jobs,
            skipped: report.skipped,
        }
    }

    pub fn total_records(&self) -> usize {
        self.jobs.iter().map(|j| j.records).sum()
    }

    pub fn total_placeholders(&self) -> usize {
        self.jobs.iter().map(|j| j.placeholders).sum()
    }

    /// Jobs that must be rerun to finish
    pub fn incomplete_jobs(&self) -> impl Iterator<Item = &JobSummary> {
        self.jobs.iter().filter(|j| j.rate_limited)
    }
}

/// Prints a harvest summary to stdout
pub fn print_summary(summary: &HarvestSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Jobs:");
    for job in &summary.jobs {
        println!(
            "  {} ({}): {} records, {} documents, {} placeholders{}",
            job.key,
            job.year,
            job.records,
            job.documents,
            job.placeholders,
            if job.rate_limited {
                " [rate limited]"
            } else {
                ""
            }
        );
        println!("    listing {}, fetch {}", job.listing, job.fetch);
        if job.resumed > 0 {
            println!("    resumed {} records from checkpoint", job.resumed);
        }
    }
    println!();

    println!("Overview:");
    println!("  Total records: {}", summary.total_records());
    println!("  Placeholders: {}", summary.total_placeholders());
    if summary.skipped > 0 {
        println!("  Skipped candidates: {}", summary.skipped);
    }

    let incomplete: Vec<_> = summary.incomplete_jobs().collect();
    if !incomplete.is_empty() {
        println!();
        println!("Rate Limited Jobs ({}):", incomplete.len());
        for job in incomplete {
            println!("  - {}", job.key);
        }
        println!("Run again later to resume them from their checkpoints.");
    }
}

/// Prints the stored checkpoints to stdout
pub fn print_checkpoint_stats(checkpoints: &[CheckpointSummary]) {
    println!("=== Checkpoints ===\n");

    if checkpoints.is_empty() {
        println!("No checkpoints stored.");
        return;
    }

    for checkpoint in checkpoints {
        println!(
            "  {}: {} records ({} placeholders), saved {}",
            checkpoint.key,
            checkpoint.records,
            checkpoint.placeholders,
            checkpoint.saved_at.as_deref().unwrap_or("at an unknown time")
        );
    }
    println!();

    let records: usize = checkpoints.iter().map(|c| c.records).sum();
    println!("Total: {} checkpoints, {} records", checkpoints.len(), records);
}

/// Short label for why a walk ended
pub fn walk_stop_label(stop: &WalkStop) -> &'static str {
    match stop {
        WalkStop::Exhausted => "complete",
        WalkStop::RateLimited { .. } => "rate limited",
        WalkStop::Failed { .. } => "failed page",
    }
}

/// Short label for why a fetch ended
pub fn fetch_stop_label(stop: &FetchStop) -> &'static str {
    match stop {
        FetchStop::Completed => "complete",
        FetchStop::RateLimited { .. } => "rate limited",
    }
}
