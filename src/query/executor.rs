//! Multi-series query executor
//!
//! Walks the selection index one measurement type at a time: bulk-fetches
//! the windowed rows of every matching series, runs the aggregation engine
//! per sensor, folds the type-level roll-up, and emits a summary. A type
//! with no matching sensors produces an empty summary; a failing sensor is
//! reported in the summary and does not stop its siblings. Only backend
//! unavailability aborts the whole query.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::aggregate::{aggregate_series, AggregateResult, RollUp};
use super::selection::SelectionIndex;
use crate::error::StorageError;
use crate::registry::SensorRegistry;
use crate::store::SeriesStore;
use crate::types::{SensorId, SensorKind, TimeWindow};

/// One sensor's windowed statistics inside a type summary
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSummary {
    /// Sensor identity
    pub id: SensorId,
    /// Windowed per-column statistics for this sensor
    pub result: AggregateResult,
}

/// Aggregated report for one measurement type
#[derive(Debug, Clone)]
pub struct KindSummary {
    /// The measurement type this summary covers
    pub kind: SensorKind,
    /// Per-sensor statistics, ordered by identity
    pub sensors: Vec<SensorSummary>,
    /// Cross-sensor column averages (count-weighted)
    pub rollup: BTreeMap<String, f64>,
    /// Total windowed rows across all sensors of this type
    pub total_count: f64,
    /// Sensors whose fetch or aggregation failed, with reasons
    pub failed: Vec<(SensorId, String)>,
}

impl fmt::Display for KindSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} sensors:", self.kind)?;
        for sensor in &self.sensors {
            writeln!(f, "  {}\t{}", sensor.id, sensor.result)?;
        }
        if self.rollup.is_empty() {
            writeln!(f, "  (no readings in window)")?;
        } else {
            write!(f, "  all {} sensors ({} rows):", self.kind, self.total_count)?;
            for (column, average) in &self.rollup {
                write!(f, "\tAvg {column} {average:.6}")?;
            }
            writeln!(f)?;
        }
        for (id, reason) in &self.failed {
            writeln!(f, "  FAILED {id}: {reason}")?;
        }
        Ok(())
    }
}

/// Read-path entry point orchestrating per-type bulk retrieval
pub struct QueryExecutor {
    series: Arc<dyn SeriesStore>,
    registry: SensorRegistry,
}

impl QueryExecutor {
    /// Create an executor over the given series store and registry
    pub fn new(series: Arc<dyn SeriesStore>, registry: SensorRegistry) -> Self {
        Self { series, registry }
    }

    /// Run the full read path for one time window
    ///
    /// Rebuilds the selection index from a fresh registry scan, then
    /// summarizes every measurement type in turn.
    pub fn run(&self, window: TimeWindow) -> Result<Vec<KindSummary>, StorageError> {
        let index = SelectionIndex::build(&self.registry, window)?;
        debug!(sensors = index.sensor_count(), "selection index built");

        let mut summaries = Vec::new();
        for (kind, predicates) in index.kinds() {
            summaries.push(self.summarize_kind(kind, predicates, &window)?);
        }
        Ok(summaries)
    }

    /// Bulk-fetch and aggregate every sensor of one measurement type
    fn summarize_kind(
        &self,
        kind: SensorKind,
        predicates: &BTreeMap<SensorId, TimeWindow>,
        window: &TimeWindow,
    ) -> Result<KindSummary, StorageError> {
        let fetched = self.series.multi_get(predicates)?;

        let mut rollup = RollUp::new();
        let mut sensors = Vec::new();
        let mut failed = Vec::new();

        for (id, rows) in fetched {
            debug!(sensor = %id, rows = rows.len(), "fetched series");
            match aggregate_series(self.series.as_ref(), &id, kind, window) {
                Ok(result) => {
                    rollup.absorb(&result);
                    sensors.push(SensorSummary { id, result });
                },
                Err(StorageError::Unavailable(message)) => {
                    return Err(StorageError::Unavailable(message));
                },
                Err(err) => {
                    warn!(sensor = %id, error = %err, "aggregation failed");
                    failed.push((id, err.to_string()));
                },
            }
        }

        Ok(KindSummary {
            kind,
            sensors,
            rollup: rollup.averages(),
            total_count: rollup.count(),
            failed,
        })
    }
}
