//! Page walker: follows a listing's `pagination.next` cursor to the end
//!
//! Every listing result contributes its `id`; results without one are not
//! documents and are skipped. Failed pages degrade per the retry policy:
//!
//! - interrupted transfer: retry once; a successful retry is read as a single
//!   result and recorded as [`ListingEntry::Recovered`], a failed retry as
//!   [`ListingEntry::Missing`]. Either way the cursor is not advanced, so the
//!   same page is requested again.
//! - HTTP 429: the walk stops and keeps what it has.
//! - anything else: one [`ListingEntry::Missing`] and, with no further cursor
//!   known, the walk ends.
//!
//! There is no page limit; a cursor cycle in the API would never terminate.

use crate::clock::Clock;
use crate::config::{ApiConfig, PacingConfig};
use crate::harvest::retry::{resolve, Attempt, Resolution, RetryPolicy};
use crate::harvest::transport::Transport;
use crate::model::ListingEntry;
use crate::FetchError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Request and pacing settings for a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkSettings {
    /// Results per page (`c`)
    pub page_size: u32,

    /// Courtesy pause
    pub page_delay: Duration,

    /// Pause after every this many successful pages
    pub throttle_every: u32,
}

impl WalkSettings {
    pub fn from_config(api: &ApiConfig, pacing: &PacingConfig) -> Self {
        Self {
            page_size: api.page_size,
            page_delay: pacing.page_delay(),
            throttle_every: pacing.page_throttle_every.max(1),
        }
    }
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default(), &PacingConfig::default())
    }
}

/// Why a walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkStop {
    /// The last page had no next cursor
    Exhausted,

    /// The API answered 429; `position` is the last page number it reported
    RateLimited { position: Option<u64> },

    /// A page failed without a retry and no further cursor was known
    Failed { error: FetchError },
}

/// Result of a complete walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Collected entries in listing order
    pub entries: Vec<ListingEntry>,

    /// Listing pages read successfully
    pub pages: usize,

    pub stop: WalkStop,
}

impl WalkOutcome {
    /// Number of real identifiers collected
    pub fn id_count(&self) -> usize {
        self.entries.iter().filter(|e| e.id().is_some()).count()
    }

    /// Number of entries standing in for failed pages
    pub fn degraded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_degraded()).count()
    }
}

/// One listing page as the walker needs it
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListingPage {
    ids: Vec<String>,
    next: Option<String>,
    current: Option<u64>,
}

impl ListingPage {
    fn parse(url: &str, body: &Value) -> Result<Self, FetchError> {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Malformed {
                url: url.to_string(),
                message: "listing response has no `results` array".to_string(),
            })?;

        let ids = results
            .iter()
            .filter_map(|result| result.get("id").and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let pagination = body.get("pagination");
        let next = pagination
            .and_then(|p| p.get("next"))
            .and_then(Value::as_str)
            .filter(|next| !next.is_empty())
            .map(str::to_string);
        let current = pagination
            .and_then(|p| p.get("current"))
            .and_then(Value::as_u64);

        Ok(Self { ids, next, current })
    }
}

/// What one page request produced
enum PageRead {
    Listing(ListingPage),
    Single(Option<String>),
}

/// Walks a paginated listing endpoint
pub struct PageWalker<'a> {
    transport: &'a dyn Transport,
    policy: &'a dyn RetryPolicy,
    clock: &'a dyn Clock,
    settings: WalkSettings,
}

impl<'a> PageWalker<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        policy: &'a dyn RetryPolicy,
        clock: &'a dyn Clock,
        settings: WalkSettings,
    ) -> Self {
        Self {
            transport,
            policy,
            clock,
            settings,
        }
    }

    /// Collects every identifier reachable from `query_url`
    ///
    /// Never fails: request errors become entries or a [`WalkStop`].
    pub async fn walk(&self, query_url: &str) -> WalkOutcome {
        let page_size = self.settings.page_size.to_string();
        let params: [(&str, &str); 3] = [
            ("fo", "json"),
            ("c", page_size.as_str()),
            ("at", "results,pagination"),
        ];

        let mut entries = Vec::new();
        let mut pages = 0usize;
        let mut position = None;
        let mut cursor = Some(query_url.to_string());

        while let Some(url) = cursor.clone() {
            let transport = self.transport;
            let params = &params;
            let page_url = url.as_str();

            let resolution = resolve(self.policy, self.clock, |attempt| async move {
                let body = transport.get_json(page_url, params).await?;
                match attempt {
                    Attempt::First => ListingPage::parse(page_url, &body).map(PageRead::Listing),
                    Attempt::Retry => Ok(PageRead::Single(
                        body.get("full_text")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    )),
                }
            })
            .await;

            match resolution {
                Resolution::Fresh(read) | Resolution::Retried(read) => match read {
                    PageRead::Listing(page) => {
                        debug!(
                            "Page {:?} of {} returned {} ids",
                            page.current,
                            url,
                            page.ids.len()
                        );
                        entries.extend(page.ids.into_iter().map(ListingEntry::Id));
                        position = page.current.or(position);
                        cursor = page.next;
                        pages += 1;
                        info!("Fetched {} items so far...", entries.len());

                        if cursor.is_some() && pages % self.settings.throttle_every as usize == 0 {
                            debug!("Waiting {:?} before the next page", self.settings.page_delay);
                            self.clock.sleep(self.settings.page_delay).await;
                        }
                    }
                    PageRead::Single(full_text) => {
                        info!("Recovered {} on retry", url);
                        entries.push(ListingEntry::Recovered { full_text });
                        self.clock.sleep(self.settings.page_delay).await;
                    }
                },
                Resolution::RetryFailed(error) => {
                    warn!("Retry failed for {}. Skipping. Error: {}", url, error);
                    entries.push(ListingEntry::Missing);
                }
                Resolution::Skipped(error) => {
                    warn!("{}. Skipping; no further page is known", error);
                    entries.push(ListingEntry::Missing);
                    return WalkOutcome {
                        entries,
                        pages,
                        stop: WalkStop::Failed { error },
                    };
                }
                Resolution::Aborted(error) => {
                    warn!(
                        "Too many requests (429) when accessing {}. Stopping early.",
                        error.url()
                    );
                    info!("Collected {} entries; current pagination: {:?}", entries.len(), position);
                    return WalkOutcome {
                        entries,
                        pages,
                        stop: WalkStop::RateLimited { position },
                    };
                }
            }
        }

        WalkOutcome {
            entries,
            pages,
            stop: WalkStop::Exhausted,
        }
    }
}
