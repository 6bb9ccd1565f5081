use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for a harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "candidate")]
    pub candidates: Vec<CandidateEntry>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the harvester
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for harvester-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Archive API request settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Results per listing page (`c` parameter)
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout", default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Courtesy delays and retry backoff, all in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Pause applied after every `page-throttle-every` successful pages
    #[serde(rename = "page-delay", default = "default_page_delay")]
    pub page_delay: u64,

    /// Number of successful pages between listing pauses
    #[serde(rename = "page-throttle-every", default = "default_page_throttle_every")]
    pub page_throttle_every: u32,

    /// Pause after every processed item
    #[serde(rename = "item-delay", default = "default_item_delay")]
    pub item_delay: u64,

    /// Wait before the single retry of an interrupted transfer
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: u64,
}

/// Where checkpoints live and how often they are written
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: CheckpointBackend,

    /// Directory for the file backend, database file for the sqlite backend
    pub path: String,

    /// Save after this many new records
    #[serde(rename = "save-every-records", default = "default_save_every_records")]
    pub save_every_records: usize,

    /// Save after this many seconds since the last save
    #[serde(rename = "save-every-seconds", default = "default_save_every_seconds")]
    pub save_every_seconds: u64,
}

/// Checkpoint storage backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// One JSON file per job in a directory
    #[default]
    File,

    /// All jobs in one SQLite database
    Sqlite,
}

/// Search query construction settings
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Collection search endpoint
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// First day of each year's search window (`MM-DD`)
    #[serde(rename = "window-start", default = "default_window_start")]
    pub window_start: String,

    /// Last day of each year's search window (`MM-DD`)
    #[serde(rename = "window-end", default = "default_window_end")]
    pub window_end: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV table of all harvested records
    #[serde(rename = "table-path")]
    pub table_path: String,
}

/// One candidate row: an election year and the name variants to search for
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateEntry {
    pub year: i32,
    pub names: Vec<String>,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl PacingConfig {
    /// Pacing with every delay set to zero
    pub fn immediate() -> Self {
        Self {
            page_delay: 0,
            page_throttle_every: default_page_throttle_every(),
            item_delay: 0,
            retry_delay: 0,
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }
}

impl CheckpointConfig {
    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_every_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay: default_page_delay(),
            page_throttle_every: default_page_throttle_every(),
            item_delay: default_item_delay(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            window_start: default_window_start(),
            window_end: default_window_end(),
        }
    }
}

fn default_page_size() -> u32 {
    100
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_page_delay() -> u64 {
    5_000
}

fn default_page_throttle_every() -> u32 {
    2
}

fn default_item_delay() -> u64 {
    4_000
}

fn default_retry_delay() -> u64 {
    15_000
}

fn default_save_every_records() -> usize {
    100
}

fn default_save_every_seconds() -> u64 {
    600
}

fn default_base_url() -> String {
    "https://www.loc.gov/collections/chronicling-america/".to_string()
}

fn default_window_start() -> String {
    "07-01".to_string()
}

fn default_window_end() -> String {
    "11-15".to_string()
}
