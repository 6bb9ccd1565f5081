//! Scripted transport for unit tests

use crate::harvest::transport::Transport;
use crate::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replays queued responses per URL and records every request
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, FetchError>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues one response for `url`; responses for a URL are served in order
    pub(crate) fn push(&self, url: &str, response: Result<Value, FetchError>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, url: &str, _params: &[(&str, &str)]) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no scripted response for {}", url))
    }
}

pub(crate) fn interrupted(url: &str) -> FetchError {
    FetchError::Interrupted {
        url: url.to_string(),
        message: "connection closed before message completed".to_string(),
    }
}

pub(crate) fn rate_limited(url: &str) -> FetchError {
    FetchError::RateLimited {
        url: url.to_string(),
    }
}

pub(crate) fn status(url: &str, code: u16) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: code,
    }
}
