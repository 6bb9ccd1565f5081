//! loc-harvest: a resumable harvester for paginated archive APIs
//!
//! This crate walks the paginated search listings of the Library of Congress
//! API, fetches the full text and metadata of every listed item, and keeps
//! checkpointed progress so interrupted runs resume without refetching.

pub mod clock;
pub mod config;
pub mod harvest;
pub mod model;
pub mod output;
pub mod query;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
///
/// Request-level failures are absorbed by the walker and the fetcher; what
/// reaches this type is configuration, client setup, or checkpoint storage.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid date in config: {0}")]
    InvalidDate(String),
}

/// A failed request against the archive API
///
/// Every variant is recovered locally by the retry policy; see
/// [`harvest::RetryPolicy`] for how each one is treated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The connection dropped while the response body was being read
    #[error("transfer interrupted for {url}: {message}")]
    Interrupted { url: String, message: String },

    /// The server answered HTTP 429
    #[error("rate limited (HTTP 429) at {url}")]
    RateLimited { url: String },

    /// Any other non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request could not be sent or timed out
    #[error("request failed for {url}: {message}")]
    Request { url: String, message: String },

    /// The body arrived but is not the JSON shape we expect
    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

impl FetchError {
    /// Returns the URL of the request that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Interrupted { url, .. }
            | Self::RateLimited { url }
            | Self::Status { url, .. }
            | Self::Request { url, .. }
            | Self::Malformed { url, .. } => url,
        }
    }
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use model::{Document, ItemRecord, ListingEntry};
pub use query::{build_search_url, derive_job_key, JobKey};
pub use harvest::{run_harvest, Harvester};
