//! HTTP transport for the archive API
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests that decode a JSON body
//! - Classifying every failure into a [`FetchError`]
//!
//! # Error Classification
//!
//! | Condition | Result |
//! |-----------|--------|
//! | HTTP 429 | `RateLimited` |
//! | Other non-2xx status | `Status` |
//! | Connect failure, send failure, timeout | `Request` |
//! | Body cut off while reading (e.g. truncated chunked encoding) | `Interrupted` |
//! | Body is not valid JSON | `Malformed` |

use crate::config::{ApiConfig, UserAgentConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Issues one GET and decodes its JSON body
///
/// The walker and the fetcher only talk to the API through this trait, so
/// tests can replay scripted failure sequences.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` with `params` appended to its query string
    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `api` - Timeouts for each request
///
/// # Example
///
/// ```no_run
/// use loc_harvest::config::{ApiConfig, UserAgentConfig};
/// use loc_harvest::harvest::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "LocHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &ApiConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    api: &ApiConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(api.request_timeout())
        .connect_timeout(api.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Transport`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: describe_send_error(&e),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_body_error(url, e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn describe_send_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}

/// Headers arrived but the body did not: a timeout is an ordinary request
/// failure, anything else means the transfer was cut off.
fn classify_body_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Request {
            url: url.to_string(),
            message: "Request timeout while reading body".to_string(),
        }
    } else {
        FetchError::Interrupted {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
