//! Search query construction
//!
//! Turns candidate rows into collection search URLs and derives the job key
//! each URL's harvest is checkpointed under.

mod job_key;
mod search;

pub use job_key::{derive_job_key, JobKey};
pub use search::build_search_url;
