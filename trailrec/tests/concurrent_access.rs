//! Two handles on one database file: a recorder writing fixes on its own
//! thread while a viewer reads.

mod common;

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use tempfile::TempDir;
use trailrec::{
    FixIngestionPipeline, LocationUpdate, SqliteTrailStore, TrailAggregator, TrailConfig,
    TrailStore,
};

const FIXES: usize = 200;

#[test]
fn test_reader_sees_consistent_prefix_while_writer_appends() {
    common::init_logger();
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("shared.db");
    let path = path.to_str().unwrap().to_string();
    let config = TrailConfig::default();

    let writer_store =
        Arc::new(SqliteTrailStore::open(&path, &config).expect("writer open failed"));
    let reader_store =
        Arc::new(SqliteTrailStore::open(&path, &config).expect("reader open failed"));

    let (done_tx, done_rx) = mpsc::channel();
    let writer = thread::spawn(move || {
        let mut pipeline = FixIngestionPipeline::new("shared", writer_store);
        for i in 0..FIXES {
            let update = LocationUpdate::new(0.0, i as f64 * 0.0001, i as i64 * 1_000);
            let outcome = pipeline.ingest(Some(&update)).expect("update dropped");
            assert!(outcome.stored.is_ok(), "write {} failed", i);
        }
        done_tx.send(pipeline.stats()).expect("failed to report stats");
    });

    // Every read is a chronological prefix of what the writer produces
    let mut last_len = 0;
    while done_rx.try_recv().is_err() {
        let fixes = reader_store.read_trail("shared").expect("read failed");
        assert!(fixes.len() >= last_len);
        assert!(
            fixes
                .windows(2)
                .all(|w| w[0].timestamp_millis <= w[1].timestamp_millis)
        );
        last_len = fixes.len();
        if last_len == FIXES {
            break;
        }
    }

    writer.join().expect("writer panicked");

    let fixes = reader_store.read_trail("shared").unwrap();
    assert_eq!(fixes.len(), FIXES);
    for (i, fix) in fixes.iter().enumerate() {
        assert_eq!(fix.timestamp_millis, i as i64 * 1_000);
    }

    let view = TrailAggregator::new(reader_store).summarize("shared").unwrap();
    assert_eq!(view.report().unwrap().summary.fix_count, FIXES);
}

#[test]
fn test_shared_handle_across_threads() {
    let store = Arc::new(SqliteTrailStore::in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                let trail_id = format!("trail-{}", t);
                let mut pipeline = FixIngestionPipeline::new(&trail_id, store);
                for i in 0..25 {
                    pipeline.ingest(Some(&LocationUpdate::new(t as f64, 0.0, i)));
                }
                pipeline.stats()
            })
        })
        .collect();

    for handle in handles {
        let stats = handle.join().unwrap();
        assert_eq!(stats.accepted, 25);
        assert_eq!(stats.write_failures, 0);
    }

    let listings = store.list_trails().unwrap();
    assert_eq!(listings.len(), 4);
    assert!(listings.iter().all(|l| l.fix_count == 25));
}
