//! Read path: bulk, type-partitioned retrieval and aggregation
//!
//! A query session rebuilds the [`SelectionIndex`](selection::SelectionIndex)
//! from a fresh registry scan, bulk-fetches every matching series per
//! measurement type, folds each one through the aggregation engine, and
//! accumulates the per-type roll-up. Failure of one series is reported
//! per identity and never stops the rest of its type.

pub mod aggregate;
pub mod executor;
pub mod selection;

pub use aggregate::{aggregate_series, AggregateResult, ColumnStats, RollUp};
pub use executor::{KindSummary, QueryExecutor, SensorSummary};
pub use selection::SelectionIndex;
