//! End-to-end integration tests for the telemetry pipeline
//!
//! These tests drive the full path a deployment exercises: host records in,
//! classification and dispatch, registry deduplication, then the bulk read
//! path with per-type roll-ups.

use std::sync::Arc;

use teleseries::ingest::{Dispatcher, SinkRecord};
use teleseries::query::{KindSummary, QueryExecutor};
use teleseries::registry::SensorRegistry;
use teleseries::store::{MemoryStore, RegistryStore};
use teleseries::types::{SensorKind, TimeWindow};

// ============================================================================
// Helper Functions
// ============================================================================

fn record(payload: &str, timestamp: i64) -> SinkRecord {
    serde_json::from_value(serde_json::json!({
        "key": null,
        "value": { "payload": payload },
        "timestamp": timestamp,
    }))
    .expect("record envelope should deserialize")
}

fn pipeline() -> (Arc<MemoryStore>, Dispatcher, QueryExecutor) {
    let store = Arc::new(MemoryStore::new());
    let registry = SensorRegistry::new(store.clone());
    let dispatcher = Dispatcher::new(store.clone(), registry.clone());
    let executor = QueryExecutor::new(store.clone(), registry);
    (store, dispatcher, executor)
}

fn summary_for(summaries: &[KindSummary], kind: SensorKind) -> &KindSummary {
    summaries
        .iter()
        .find(|summary| summary.kind == kind)
        .expect("every kind has a summary")
}

/// A mixed batch: companions, readings from all three kinds, a duplicate
/// companion, and one malformed payload in the middle
fn mixed_batch() -> Vec<SinkRecord> {
    let mut records = vec![
        record(r#"{"id":"light-1","type":"light"}"#, 1_000),
        record(r#"{"id":"watt-1","type":"watts"}"#, 1_000),
        record(r#"{"id":"volt-1","type":"volts"}"#, 1_000),
    ];
    for i in 0..10i64 {
        records.push(record(
            &format!(r#"{{"id":"light-1","light":{},"sound":0.5}}"#, 10 + i),
            2_000 + i,
        ));
    }
    for i in 0..20i64 {
        records.push(record(
            &format!(r#"{{"id":"watt-1","watts":{},"heat":1.0}}"#, i),
            2_000 + i,
        ));
    }
    records.push(record("garbage not json", 2_500));
    for i in 0..5i64 {
        records.push(record(
            &format!(r#"{{"id":"volt-1","volts":{},"amps":2.0}}"#, 230 + i),
            2_000 + i,
        ));
    }
    // Re-delivered companion, much later
    records.push(record(r#"{"id":"light-1","type":"light"}"#, 9_000));
    records
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_mixed_batch_end_to_end() {
    let (store, dispatcher, executor) = pipeline();
    let report = dispatcher.process_batch(&mixed_batch()).unwrap();

    assert_eq!(report.appended, 35);
    assert_eq!(report.registered, 3);
    // Every reading after the first sighting of an identity is a duplicate
    // registration, plus the re-delivered companion
    assert_eq!(report.duplicates, 36);
    assert_eq!(report.skipped.len(), 1);

    assert_eq!(store.registry_count(), 3);
    assert_eq!(store.series_count(), 3);

    let summaries = executor.run(TimeWindow::unbounded()).unwrap();
    assert_eq!(summaries.len(), 3);

    let lights = summary_for(&summaries, SensorKind::Light);
    assert_eq!(lights.total_count, 10.0);
    // Values 10..=19 average to 14.5
    assert!((lights.rollup["light"] - 14.5).abs() < 1e-9);
    assert!((lights.rollup["sound"] - 0.5).abs() < 1e-9);

    let watts = summary_for(&summaries, SensorKind::Power);
    assert_eq!(watts.total_count, 20.0);
    // Values 0..=19 average to 9.5
    assert!((watts.rollup["watts"] - 9.5).abs() < 1e-9);

    let volts = summary_for(&summaries, SensorKind::Electricity);
    assert_eq!(volts.total_count, 5.0);
    assert!((volts.rollup["volts"] - 232.0).abs() < 1e-9);
}

#[test]
fn test_registration_survives_redelivery_unchanged() {
    let (store, dispatcher, _) = pipeline();
    dispatcher.process_batch(&mixed_batch()).unwrap();

    let entry = store.get("light-1").unwrap().unwrap();
    assert_eq!(entry.kind, SensorKind::Light);
    // First sighting at 1_000 wins over the re-delivered companion at 9_000
    assert_eq!(entry.registered_at, 1_000);
}

#[test]
fn test_rollup_matches_brute_force_over_union() {
    let (store, dispatcher, executor) = pipeline();

    let mut records = Vec::new();
    let fleets: &[(&str, usize, f64)] = &[("w-a", 4, 2.0), ("w-b", 9, 11.0), ("w-c", 25, 7.5)];
    for (id, rows, base) in fleets {
        for i in 0..*rows {
            records.push(record(
                &format!(
                    r#"{{"id":"{id}","watts":{},"heat":{}}}"#,
                    base + i as f64,
                    i as f64 / 2.0
                ),
                1_000 + i as i64,
            ));
        }
    }
    dispatcher.process_batch(&records).unwrap();

    let summaries = executor.run(TimeWindow::unbounded()).unwrap();
    let watts = summary_for(&summaries, SensorKind::Power);

    // Brute-force recomputation over the union of all rows
    let union: Vec<f64> = fleets
        .iter()
        .flat_map(|(_, rows, base)| (0..*rows).map(move |i| base + i as f64))
        .collect();
    let true_average = union.iter().sum::<f64>() / union.len() as f64;

    assert_eq!(watts.total_count, union.len() as f64);
    assert!((watts.rollup["watts"] - true_average).abs() < 1e-9);

    // Per-sensor weighted averages expand back to exact sums
    for sensor in &watts.sensors {
        let (_, rows, base) = fleets
            .iter()
            .find(|(id, _, _)| *id == sensor.id)
            .unwrap();
        let expected: f64 = (0..*rows).map(|i| base + i as f64).sum();
        let recovered = sensor.result.columns["watts"].weighted_average * sensor.result.count;
        assert!((recovered - expected).abs() < 1e-9);
    }
}

#[test]
fn test_windowed_report_excludes_outside_rows() {
    let (_, dispatcher, executor) = pipeline();
    let records = vec![
        record(r#"{"id":"e1","volts":100.0,"amps":1.0}"#, 1_000),
        record(r#"{"id":"e1","volts":200.0,"amps":1.0}"#, 2_000),
        record(r#"{"id":"e1","volts":900.0,"amps":1.0}"#, 8_000),
    ];
    dispatcher.process_batch(&records).unwrap();

    let summaries = executor.run(TimeWindow::between(1_000, 2_000)).unwrap();
    let volts = summary_for(&summaries, SensorKind::Electricity);
    assert_eq!(volts.total_count, 2.0);
    assert!((volts.rollup["volts"] - 150.0).abs() < 1e-9);
}

#[test]
fn test_same_timestamp_overwrite_is_visible_on_read() {
    let (_, dispatcher, executor) = pipeline();
    let records = vec![
        record(r#"{"id":"e1","volts":100.0,"amps":1.0}"#, 1_000),
        record(r#"{"id":"e1","volts":300.0,"amps":3.0}"#, 1_000),
    ];
    dispatcher.process_batch(&records).unwrap();

    let summaries = executor.run(TimeWindow::unbounded()).unwrap();
    let volts = summary_for(&summaries, SensorKind::Electricity);
    // The second write replaced the first row instead of adding one
    assert_eq!(volts.total_count, 1.0);
    assert!((volts.rollup["volts"] - 300.0).abs() < 1e-9);
}

#[test]
fn test_empty_store_reports_every_kind_empty() {
    let (_, _, executor) = pipeline();
    let summaries = executor.run(TimeWindow::unbounded()).unwrap();
    assert_eq!(summaries.len(), 3);
    for summary in summaries {
        assert!(summary.sensors.is_empty());
        assert!(summary.rollup.is_empty());
        assert_eq!(summary.total_count, 0.0);
    }
}
