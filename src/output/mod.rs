//! Output module for exporting harvested records
//!
//! This module handles:
//! - Flattening per-job record lists into one table
//! - Writing the CSV export
//! - Summarizing harvests and stored checkpoints

pub mod stats;
mod table;

pub use stats::{print_checkpoint_stats, print_summary, HarvestSummary, JobSummary};
pub use table::{format_table, write_table, COLUMNS};

use crate::model::ItemRecord;
use thiserror::Error;

/// Output-specific errors
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Concatenates per-job record lists, preserving job order
pub fn flatten_records<'a, I>(jobs: I) -> Vec<ItemRecord>
where
    I: IntoIterator<Item = &'a [ItemRecord]>,
{
    jobs.into_iter().flat_map(|records| records.iter().cloned()).collect()
}
