//! Checkpoint and resume tests
//!
//! A rate-limited run persists what it finished; the next run picks up at the
//! checkpoint length without refetching.

use crate::common::*;
use loc_harvest::config::CheckpointBackend;
use loc_harvest::harvest::FetchStop;
use loc_harvest::storage::{CheckpointStore, SqliteCheckpointStore};
use loc_harvest::{Document, ItemRecord};
use std::path::Path;
use wiremock::MockServer;

const KEY: &str = "Abraham_Lincoln_1860-07-01_1860-11-15";

async fn resume_after_rate_limit(backend: CheckpointBackend) {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, 1860, 4, 2).await;
    mount_details(&server, 1..=2).await;
    mount_status(&server, 3, 429).await;

    let config = create_test_config(
        &server,
        dir.path(),
        backend,
        vec![candidate(1860, &["Abraham Lincoln"])],
    );

    let first = harvester(config.clone()).run(false).await.unwrap();
    assert_eq!(first.jobs[0].fetch.stop, FetchStop::RateLimited { index: 2 });
    assert_eq!(first.jobs[0].fetch.records.len(), 2);
    assert_eq!(
        requested_items(&server).await,
        vec![item_path(1), item_path(2), item_path(3)]
    );

    // The limit has lifted
    server.reset().await;
    mount_listing(&server, 1860, 4, 2).await;
    mount_details(&server, 1..=4).await;

    let second = harvester(config).run(false).await.unwrap();
    let job = &second.jobs[0];
    assert_eq!(job.fetch.resumed_from, 2);
    assert_eq!(job.fetch.stop, FetchStop::Completed);
    assert_eq!(job.fetch.records.len(), 4);
    assert_eq!(requested_items(&server).await, vec![item_path(3), item_path(4)]);

    let numbers: Vec<_> = job
        .fetch
        .records
        .iter()
        .map(|r| r.document().and_then(|d| d.control_number.clone()))
        .collect();
    assert_eq!(
        numbers,
        ["sn1", "sn2", "sn3", "sn4"].map(|n| Some(n.to_string()))
    );
}

#[tokio::test]
async fn test_resume_after_rate_limit_file_backend() {
    resume_after_rate_limit(CheckpointBackend::File).await;
}

#[tokio::test]
async fn test_resume_after_rate_limit_sqlite_backend() {
    resume_after_rate_limit(CheckpointBackend::Sqlite).await;
}

#[tokio::test]
async fn test_resume_from_existing_checkpoint_skips_done_items() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, 1860, 5, 2).await;
    mount_details(&server, 4..=5).await;

    let config = create_test_config(
        &server,
        dir.path(),
        CheckpointBackend::Sqlite,
        vec![candidate(1860, &["Abraham Lincoln"])],
    );
    let earlier = vec![
        ItemRecord::Document(Document::recovered(Some("one".to_string()), Some("Abraham_Lincoln"))),
        ItemRecord::Placeholder,
        ItemRecord::Document(Document::recovered(Some("three".to_string()), Some("Abraham_Lincoln"))),
    ];
    {
        let mut store = SqliteCheckpointStore::new(Path::new(&config.checkpoint.path)).unwrap();
        store.save(KEY, &earlier).unwrap();
    }

    let report = harvester(config).run(false).await.unwrap();

    let job = &report.jobs[0];
    assert_eq!(job.fetch.resumed_from, 3);
    assert_eq!(&job.fetch.records[..3], &earlier[..]);
    assert_eq!(job.fetch.records.len(), 5);
    assert_eq!(requested_items(&server).await, vec![item_path(4), item_path(5)]);
}

#[tokio::test]
async fn test_fresh_run_refetches_everything() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(&server, 1860, 2, 2).await;
    mount_details(&server, 1..=2).await;

    let config = create_test_config(
        &server,
        dir.path(),
        CheckpointBackend::File,
        vec![candidate(1860, &["Abraham Lincoln"])],
    );
    harvester(config.clone()).run(false).await.unwrap();

    let report = harvester(config).run(true).await.unwrap();

    assert_eq!(report.jobs[0].fetch.resumed_from, 0);
    assert_eq!(report.jobs[0].fetch.records.len(), 2);
    assert_eq!(requested_items(&server).await.len(), 4);
}
