//! Aggregation engine: per-column statistics and cross-sensor roll-ups
//!
//! Statistics are computed inside the store (one aggregate call per column
//! and op); the row count is computed once per series and reused for every
//! column. The roll-up follows an expand-then-contract protocol: each
//! sensor's column mean is multiplied by its row count to recover a sum,
//! sums are added elementwise across sensors, and the total is divided by
//! the summed count at the very end. Averaging the per-sensor averages
//! directly would weight a 10-row sensor the same as a 10,000-row one and
//! is never done here.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::StorageError;
use crate::store::{AggregateOp, SeriesStore};
use crate::types::{SensorKind, TimeWindow};

/// Windowed statistics for one series column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Arithmetic mean over the windowed rows
    pub weighted_average: f64,
    /// Sample standard deviation over the windowed rows
    pub std_dev: f64,
}

/// Windowed statistics for one series, derived per query and never stored
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Number of windowed rows, shared by every column
    pub count: f64,
    /// Per-column statistics; empty when the window holds no rows
    pub columns: BTreeMap<String, ColumnStats>,
}

impl AggregateResult {
    /// Expand each column mean back into a windowed sum (`mean * count`)
    ///
    /// These sums are the values the roll-up accumulates across sensors.
    pub fn column_sums(&self) -> BTreeMap<String, f64> {
        self.columns
            .iter()
            .map(|(name, stats)| (name.clone(), stats.weighted_average * self.count))
            .collect()
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "count: {}", self.count)?;
        for (name, stats) in &self.columns {
            write!(
                f,
                "\tAvg: {name} {:.6} Min: {name} {:.6} Max: {name} {:.6} Std.Dev: {name} {:.6}",
                stats.weighted_average, stats.min, stats.max, stats.std_dev
            )?;
        }
        Ok(())
    }
}

/// Compute the windowed statistics for one series
///
/// Issues the count once (against the schema's leading column) and then
/// min/max/mean/std-dev per column. An empty window produces count 0 with
/// no column entries rather than NaN sentinels.
pub fn aggregate_series(
    store: &dyn SeriesStore,
    id: &str,
    kind: SensorKind,
    window: &TimeWindow,
) -> Result<AggregateResult, StorageError> {
    let count = store.aggregate(id, window, kind.token(), AggregateOp::Count)?;

    let mut columns = BTreeMap::new();
    if count > 0.0 {
        for column in kind.columns() {
            let min = store.aggregate(id, window, column, AggregateOp::Min)?;
            let max = store.aggregate(id, window, column, AggregateOp::Max)?;
            let weighted_average =
                store.aggregate(id, window, column, AggregateOp::WeightedAverage)?;
            let std_dev = store.aggregate(id, window, column, AggregateOp::StdDev)?;
            columns.insert(
                column.to_string(),
                ColumnStats {
                    min,
                    max,
                    weighted_average,
                    std_dev,
                },
            );
        }
    }

    Ok(AggregateResult { count, columns })
}

/// Accumulator for the type-level roll-up across many sensors
///
/// The first absorbed result seeds the sum map; every later result adds its
/// column sums elementwise. Sensors of one measurement type share a schema,
/// so the column keys line up across all of them.
#[derive(Debug, Clone, Default)]
pub struct RollUp {
    count: f64,
    sums: BTreeMap<String, f64>,
}

impl RollUp {
    /// Empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sensor's windowed result into the roll-up
    ///
    /// Results with zero windowed rows contribute nothing.
    pub fn absorb(&mut self, result: &AggregateResult) {
        if result.count == 0.0 {
            return;
        }
        self.count += result.count;
        if self.sums.is_empty() {
            self.sums = result.column_sums();
        } else {
            for (column, sum) in result.column_sums() {
                *self.sums.entry(column).or_insert(0.0) += sum;
            }
        }
    }

    /// Total windowed rows absorbed so far
    pub fn count(&self) -> f64 {
        self.count
    }

    /// True when nothing has been absorbed
    pub fn is_empty(&self) -> bool {
        self.count == 0.0
    }

    /// Contract the accumulated sums into cross-sensor averages
    ///
    /// Every summed value is divided by the total count; an empty roll-up
    /// yields an empty map.
    pub fn averages(&self) -> BTreeMap<String, f64> {
        if self.count == 0.0 {
            return BTreeMap::new();
        }
        self.sums
            .iter()
            .map(|(column, sum)| (column.clone(), sum / self.count))
            .collect()
    }
}
