use acquaint::{run_batch, run_source, MaxResult, RunSettings, SourceError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn settings() -> RunSettings {
    RunSettings {
        workers: 3,
        chunk_size: 2,
        ..Default::default()
    }
}

#[tokio::test]
async fn shared_friend_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "pair.csv", "1,2\n3,2\n");

    let report = run_source(&path, &settings()).await.unwrap();
    assert_eq!(
        report.max,
        MaxResult {
            count: 1,
            persons: vec![1, 3]
        }
    );
    assert_eq!(report.persons, 3);
}

#[tokio::test]
async fn self_call_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "self.csv", "5,5\n5,6\n");

    let report = run_source(&path, &settings()).await.unwrap();
    assert_eq!(report.max, MaxResult::default());
    assert_eq!(report.stats.self_calls, 1);
    assert_eq!(report.stats.accepted, 1);
    assert_eq!(report.persons, 2);
}

#[tokio::test]
async fn hub_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(
        &dir,
        "hub.csv",
        "caller,callee\n123456789012345,1\n123456789012345,2\n3,123456789012345\n",
    );

    let report = run_source(&path, &settings()).await.unwrap();
    assert_eq!(
        report.max,
        MaxResult {
            count: 2,
            persons: vec![1, 2, 3]
        }
    );
    assert!(report.stats.header_skipped);
}

#[tokio::test]
async fn malformed_row_does_not_disturb_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let clean = write_source(&dir, "clean.csv", "1,2\n3,2\n4,3\n");
    let noisy = write_source(&dir, "noisy.csv", "1,2\nabc,123\n3,2\n4,3\n");

    let clean = run_source(&clean, &settings()).await.unwrap();
    let noisy = run_source(&noisy, &settings()).await.unwrap();
    assert_eq!(noisy.max, clean.max);
    assert_eq!(noisy.persons, clean.persons);
    assert_eq!(noisy.stats.malformed, 1);
    assert_eq!(noisy.stats.accepted, clean.stats.accepted);
}

#[tokio::test]
async fn batch_reports_failures_apart_from_empty_results() {
    let dir = tempfile::tempdir().unwrap();
    let empty = write_source(&dir, "empty.csv", "calling,called\n");
    let huge = write_source(&dir, "huge.csv", "1,2\n2,3\n3,4\n4,5\n");
    let missing = dir.path().join("missing.csv");
    let good = write_source(&dir, "good.csv", "1,2\n3,2\n");

    let limited = RunSettings {
        max_records: 3,
        ..settings()
    };
    let paths = vec![empty.clone(), huge.clone(), missing.clone(), good.clone()];
    let outcomes = run_batch(&paths, &limited).await;
    assert_eq!(outcomes.len(), 4);

    let empty_report = outcomes[0].as_ref().unwrap();
    assert_eq!(empty_report.max, MaxResult::default());
    assert_eq!(empty_report.persons, 0);

    match &outcomes[1] {
        Err(SourceError::CapacityExceeded { path, limit }) => {
            assert_eq!(path, &huge);
            assert_eq!(*limit, 3);
        }
        other => panic!("expected capacity failure, got {:?}", other),
    }

    match &outcomes[2] {
        Err(e @ SourceError::SourceUnreadable { .. }) => assert_eq!(e.path(), missing.as_path()),
        other => panic!("expected unreadable source, got {:?}", other),
    }

    let good_report = outcomes[3].as_ref().unwrap();
    assert_eq!(good_report.source, good);
    assert_eq!(good_report.max.persons, vec![1, 3]);
}

#[tokio::test]
async fn generated_log_is_stable_across_worker_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated.csv");
    acquaint::generate::generate_file(
        &path,
        &acquaint::generate::CallLogSettings {
            records: 5_000,
            people: 400,
            hubs: 2,
            hub_share: 0.3,
            seed: Some(2014),
            header: true,
        },
    )
    .unwrap();

    let single = run_source(
        &path,
        &RunSettings {
            workers: 1,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let sharded = run_source(
        &path,
        &RunSettings {
            workers: 6,
            chunk_size: 97,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(single.max, sharded.max);
    assert_eq!(single.stats, sharded.stats);
    assert_eq!(single.stats.records, 5_000);
    assert!(single.max.count > 0);
}
