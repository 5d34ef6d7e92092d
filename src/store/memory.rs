//! In-process store backing tests and the standalone CLI
//!
//! Series state lives behind a `parking_lot` lock as per-sensor
//! timestamp-ordered maps; the registry collection is a concurrent map whose
//! entry API provides the atomic conditional insert the registry's
//! first-write-wins contract requires.

use std::collections::{BTreeMap, HashMap};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

use super::{AggregateOp, RegistryStore, SeriesStore};
use crate::error::StorageError;
use crate::types::{Reading, RegistryEntry, SensorId, SensorKind, SeriesRow, TimeWindow, Timestamp};

/// One sensor's series: its fixed variant plus the timestamp-keyed rows
struct SeriesState {
    kind: SensorKind,
    rows: BTreeMap<Timestamp, Reading>,
}

/// In-memory implementation of both storage traits
#[derive(Default)]
pub struct MemoryStore {
    series: RwLock<HashMap<SensorId, SeriesState>>,
    registry: DashMap<SensorId, RegistryEntry>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored series
    pub fn series_count(&self) -> usize {
        self.series.read().len()
    }

    /// Number of registry entries
    pub fn registry_count(&self) -> usize {
        self.registry.len()
    }

    /// Collect the windowed column values of one series
    fn windowed_values(
        &self,
        id: &str,
        window: &TimeWindow,
        column: &str,
    ) -> Result<Vec<f64>, StorageError> {
        let series = self.series.read();
        let state = series
            .get(id)
            .ok_or_else(|| StorageError::SeriesNotFound(id.to_string()))?;
        if !state.kind.columns().contains(&column) {
            return Err(StorageError::UnknownColumn {
                kind: state.kind,
                column: column.to_string(),
            });
        }
        Ok(state
            .rows
            .iter()
            .filter(|(ts, _)| window.contains(**ts))
            .filter_map(|(_, reading)| reading.value(column))
            .collect())
    }
}

impl SeriesStore for MemoryStore {
    fn put_series(&self, id: &str, kind: SensorKind) -> Result<(), StorageError> {
        let mut series = self.series.write();
        match series.get(id) {
            Some(state) if state.kind != kind => Err(StorageError::SchemaMismatch {
                id: id.to_string(),
                existing: state.kind,
                incoming: kind,
            }),
            Some(_) => Ok(()),
            None => {
                series.insert(
                    id.to_string(),
                    SeriesState {
                        kind,
                        rows: BTreeMap::new(),
                    },
                );
                Ok(())
            },
        }
    }

    fn append(
        &self,
        id: &str,
        timestamp: Timestamp,
        reading: &Reading,
    ) -> Result<(), StorageError> {
        let mut series = self.series.write();
        let state = series
            .get_mut(id)
            .ok_or_else(|| StorageError::SeriesNotFound(id.to_string()))?;
        if state.kind != reading.kind() {
            return Err(StorageError::SchemaMismatch {
                id: id.to_string(),
                existing: state.kind,
                incoming: reading.kind(),
            });
        }
        // BTreeMap insert overwrites an existing row at the same key
        state.rows.insert(timestamp, *reading);
        Ok(())
    }

    fn query(&self, id: &str, window: &TimeWindow) -> Result<Vec<SeriesRow>, StorageError> {
        let series = self.series.read();
        let state = series
            .get(id)
            .ok_or_else(|| StorageError::SeriesNotFound(id.to_string()))?;
        Ok(state
            .rows
            .iter()
            .filter(|(ts, _)| window.contains(**ts))
            .map(|(ts, reading)| SeriesRow {
                timestamp: *ts,
                reading: *reading,
            })
            .collect())
    }

    fn aggregate(
        &self,
        id: &str,
        window: &TimeWindow,
        column: &str,
        op: AggregateOp,
    ) -> Result<f64, StorageError> {
        let values = self.windowed_values(id, window, column)?;
        Ok(compute(op, &values))
    }

    fn multi_get(
        &self,
        predicates: &BTreeMap<SensorId, TimeWindow>,
    ) -> Result<BTreeMap<SensorId, Vec<SeriesRow>>, StorageError> {
        let mut results = BTreeMap::new();
        for (id, window) in predicates {
            match self.query(id, window) {
                Ok(rows) => {
                    results.insert(id.clone(), rows);
                },
                // A registered identity whose series was never created simply
                // contributes no rows, matching a bulk scan over absent keys
                Err(StorageError::SeriesNotFound(_)) => {},
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }
}

impl RegistryStore for MemoryStore {
    fn put_if_absent(&self, entry: RegistryEntry) -> Result<bool, StorageError> {
        match self.registry.entry(entry.id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(true)
            },
        }
    }

    fn get(&self, id: &str) -> Result<Option<RegistryEntry>, StorageError> {
        Ok(self.registry.get(id).map(|entry| entry.value().clone()))
    }

    fn scan(&self) -> Result<Vec<RegistryEntry>, StorageError> {
        let mut entries: Vec<RegistryEntry> =
            self.registry.iter().map(|entry| entry.value().clone()).collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }
}

/// Evaluate one aggregate over the collected values
///
/// Empty input yields 0.0 for every op; callers gate the per-column stats on
/// a non-zero count.
fn compute(op: AggregateOp, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match op {
        AggregateOp::Count => values.len() as f64,
        AggregateOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateOp::WeightedAverage => values.iter().sum::<f64>() / values.len() as f64,
        AggregateOp::StdDev => sample_std_dev(values),
    }
}

/// Sample standard deviation via Welford's algorithm (0.0 below two values)
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &value) in values.iter().enumerate() {
        let delta = value - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (value - mean);
    }
    (m2 / (values.len() - 1) as f64).sqrt()
}
