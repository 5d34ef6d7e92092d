//! Selection index: measurement type → {identity → time predicate}
//!
//! Built once per query session from a full registry scan; it is not an
//! incrementally maintained structure. Every identity of interest shares the
//! caller's single time window, and every measurement type is present as a
//! key so that a type with no sensors still yields an (empty) summary.

use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::registry::SensorRegistry;
use crate::types::{SensorId, SensorKind, TimeWindow};

/// Type-partitioned map of selection predicates for one query session
#[derive(Debug, Clone)]
pub struct SelectionIndex {
    entries: BTreeMap<SensorKind, BTreeMap<SensorId, TimeWindow>>,
}

impl SelectionIndex {
    /// Build the index from a fresh registry scan
    ///
    /// The same `window` is attached to every identity; time bounds come
    /// from the read-path caller, never per sensor.
    pub fn build(registry: &SensorRegistry, window: TimeWindow) -> Result<Self, StorageError> {
        let mut entries: BTreeMap<SensorKind, BTreeMap<SensorId, TimeWindow>> = SensorKind::ALL
            .iter()
            .map(|kind| (*kind, BTreeMap::new()))
            .collect();

        for entry in registry.scan()? {
            entries
                .entry(entry.kind)
                .or_default()
                .insert(entry.id, window);
        }

        Ok(Self { entries })
    }

    /// Iterate the predicate maps, one per measurement type
    pub fn kinds(&self) -> impl Iterator<Item = (SensorKind, &BTreeMap<SensorId, TimeWindow>)> {
        self.entries.iter().map(|(kind, map)| (*kind, map))
    }

    /// Predicates for one measurement type
    pub fn predicates(&self, kind: SensorKind) -> Option<&BTreeMap<SensorId, TimeWindow>> {
        self.entries.get(&kind)
    }

    /// Total number of selected identities across all types
    pub fn sensor_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}
