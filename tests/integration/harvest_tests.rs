//! End-to-end harvest tests against a mock archive API

use crate::common::*;
use loc_harvest::config::CheckpointBackend;
use loc_harvest::harvest::{run_harvest, FetchStop, WalkStop};
use loc_harvest::storage::{CheckpointStore, FileCheckpointStore};
use loc_harvest::ItemRecord;
use serde_json::json;
use std::fs;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_harvest_collects_every_item_across_pages() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, 1860, 5, 2).await;
    mount_details(&server, 1..=5).await;

    let config = create_test_config(
        &server,
        dir.path(),
        CheckpointBackend::File,
        vec![candidate(1860, &["Abraham Lincoln", "Lincoln"])],
    );
    let mut harvester = harvester(config);

    let report = harvester.run(false).await.unwrap();

    assert_eq!(report.jobs.len(), 1);
    let job = &report.jobs[0];
    assert_eq!(job.walk, WalkStop::Exhausted);
    assert_eq!(job.listed, 5);
    assert_eq!(job.fetch.stop, FetchStop::Completed);
    assert_eq!(job.fetch.records.len(), 5);

    let numbers: Vec<_> = job
        .fetch
        .records
        .iter()
        .map(|r| r.document().unwrap().control_number.clone().unwrap())
        .collect();
    assert_eq!(numbers, vec!["sn1", "sn2", "sn3", "sn4", "sn5"]);

    let doc = job.fetch.records[0].document().unwrap();
    assert_eq!(doc.name.as_deref(), Some("Abraham_Lincoln"));
    assert_eq!(doc.city.as_deref(), Some("springfield"));
    assert_eq!(doc.state.as_deref(), Some("illinois"));

    let store = FileCheckpointStore::new(&dir.path().join("checkpoints")).unwrap();
    let saved = store
        .load("Abraham_Lincoln_1860-07-01_1860-11-15")
        .unwrap()
        .unwrap();
    assert_eq!(saved, job.fetch.records);
}

#[tokio::test]
async fn test_failed_item_becomes_placeholder_and_harvest_continues() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, 1860, 3, 2).await;
    mount_details(&server, [1, 3]).await;
    mount_status(&server, 2, 500).await;

    let config = create_test_config(
        &server,
        dir.path(),
        CheckpointBackend::Sqlite,
        vec![candidate(1860, &["Abraham Lincoln"])],
    );
    let mut harvester = harvester(config);

    let report = harvester.run(false).await.unwrap();

    let records = &report.jobs[0].fetch.records;
    assert_eq!(records.len(), 3);
    assert!(!records[0].is_placeholder());
    assert_eq!(records[1], ItemRecord::Placeholder);
    assert!(!records[2].is_placeholder());
    assert_eq!(report.jobs[0].fetch.stop, FetchStop::Completed);

    let listed = harvester.store().list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].records, 3);
    assert_eq!(listed[0].placeholders, 1);
}

#[tokio::test]
async fn test_listing_rate_limit_keeps_collected_ids() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_details(&server, 1..=2).await;

    // Page 1 lists two items and points to a page that answers 429
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start_date", "1860-07-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": item_url(&server, 1) }, { "id": item_url(&server, 2) }],
            "pagination": {
                "next": format!("{}{}?sp=2", server.uri(), SEARCH_PATH),
                "current": 1
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("sp", "2"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let config = create_test_config(
        &server,
        dir.path(),
        CheckpointBackend::File,
        vec![candidate(1860, &["Abraham Lincoln"])],
    );
    let mut harvester = harvester(config);

    let report = harvester.run(false).await.unwrap();

    let job = &report.jobs[0];
    assert_eq!(job.walk, WalkStop::RateLimited { position: Some(1) });
    assert_eq!(job.listed, 2);
    assert_eq!(job.fetch.records.len(), 2);
    assert!(job.rate_limited());
}

#[tokio::test]
async fn test_run_harvest_writes_table() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, 1860, 2, 2).await;
    mount_details(&server, 1..=2).await;
    mount_listing(&server, 1864, 1, 2).await;

    let config = create_test_config(
        &server,
        dir.path(),
        CheckpointBackend::File,
        vec![
            candidate(1860, &["Abraham Lincoln"]),
            candidate(1864, &["George McClellan"]),
        ],
    );
    let table_path = config.output.table_path.clone();

    let summary = run_harvest(config, false).await.unwrap();

    assert_eq!(summary.jobs.len(), 2);
    assert_eq!(summary.total_records(), 3);

    let table = fs::read_to_string(table_path).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(
        lines[0],
        ",name,library_of_congress_control_number,date,location_city,location_state,full_text"
    );
    assert_eq!(
        lines[1],
        "0,Abraham_Lincoln,sn1,1860-08-01,springfield,illinois,text of item 1"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[3].starts_with("2,George_McClellan,sn1,"));
}
