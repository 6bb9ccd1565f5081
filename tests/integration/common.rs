//! Shared fixtures for the integration tests

use loc_harvest::config::{
    ApiConfig, CandidateEntry, CheckpointBackend, CheckpointConfig, Config, OutputConfig,
    PacingConfig, SearchConfig, UserAgentConfig,
};
use loc_harvest::harvest::{build_http_client, Harvester, HttpTransport};
use loc_harvest::storage::open_checkpoint_store;
use loc_harvest::ManualClock;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/collections/chronicling-america/";

/// Creates a test configuration pointing at the mock server
pub fn create_test_config(
    server: &MockServer,
    work_dir: &Path,
    backend: CheckpointBackend,
    candidates: Vec<CandidateEntry>,
) -> Config {
    let checkpoint_path = match backend {
        CheckpointBackend::File => work_dir.join("checkpoints"),
        CheckpointBackend::Sqlite => work_dir.join("checkpoints.db"),
    };

    Config {
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        api: ApiConfig {
            page_size: 2,
            ..ApiConfig::default()
        },
        pacing: PacingConfig::immediate(),
        checkpoint: CheckpointConfig {
            backend,
            path: checkpoint_path.to_string_lossy().into_owned(),
            save_every_records: 100,
            save_every_seconds: 600,
        },
        search: SearchConfig {
            base_url: format!("{}{}", server.uri(), SEARCH_PATH),
            ..SearchConfig::default()
        },
        output: OutputConfig {
            table_path: work_dir.join("table.csv").to_string_lossy().into_owned(),
        },
        candidates,
    }
}

pub fn candidate(year: i32, names: &[&str]) -> CandidateEntry {
    CandidateEntry {
        year,
        names: names.iter().map(|n| n.to_string()).collect(),
    }
}

/// Builds a harvester with real HTTP and storage but a manual clock
pub fn harvester(config: Config) -> Harvester {
    let client = build_http_client(&config.user_agent, &config.api).unwrap();
    let store = open_checkpoint_store(&config.checkpoint).unwrap();
    Harvester::with_parts(
        config,
        Box::new(HttpTransport::new(client)),
        store,
        Arc::new(ManualClock::new()),
    )
}

pub fn item_url(server: &MockServer, n: usize) -> String {
    format!("{}/resource/item-{}/", server.uri(), n)
}

pub fn item_path(n: usize) -> String {
    format!("/resource/item-{}/", n)
}

pub fn detail(n: usize) -> Value {
    json!({
        "full_text": format!("text of item {}", n),
        "item": {
            "library_of_congress_control_number": format!("sn{}", n),
            "date": "1860-08-01",
            "location_city": ["springfield", "chicago"],
            "location_state": ["illinois"]
        }
    })
}

/// Mounts a listing of items `1..=total` split into pages of `page_size`
///
/// The first page is matched on the search's `start_date`; later pages are
/// reached through `pagination.next` and matched on `sp`.
pub async fn mount_listing(server: &MockServer, year: i32, total: usize, page_size: usize) {
    let pages = ((total + page_size - 1) / page_size).max(1);

    for page in 1..=pages {
        let first = (page - 1) * page_size + 1;
        let last = (page * page_size).min(total);
        let results: Vec<Value> = (first..=last)
            .map(|n| json!({ "id": item_url(server, n) }))
            .collect();
        let next = if page < pages {
            Value::String(format!(
                "{}{}?year={}&sp={}",
                server.uri(),
                SEARCH_PATH,
                year,
                page + 1
            ))
        } else {
            Value::Null
        };
        let body = json!({
            "results": results,
            "pagination": { "next": next, "current": page }
        });

        let mock = Mock::given(method("GET")).and(path(SEARCH_PATH));
        let mock = if page == 1 {
            mock.and(query_param("start_date", format!("{}-07-01", year)))
        } else {
            mock.and(query_param("year", year.to_string()))
                .and(query_param("sp", page.to_string()))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

/// Mounts a detail response for each item in `items`
pub async fn mount_details(server: &MockServer, items: impl IntoIterator<Item = usize>) {
    for n in items {
        Mock::given(method("GET"))
            .and(path(item_path(n)))
            .and(query_param("fo", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail(n)))
            .mount(server)
            .await;
    }
}

/// Mounts a fixed status response for item `n`
pub async fn mount_status(server: &MockServer, n: usize, status: u16) {
    Mock::given(method("GET"))
        .and(path(item_path(n)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Paths of every detail request the server has seen
pub async fn requested_items(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|request| request.url.path().to_string())
        .filter(|p| p.starts_with("/resource/"))
        .collect()
}
