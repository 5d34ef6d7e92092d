//! Storage boundary for per-sensor series and the registry collection
//!
//! The time-series store itself is an external system; the core only
//! consumes the two traits below. `MemoryStore` is the in-process
//! implementation used by tests and the standalone CLI. A network-backed
//! store would implement the same traits against its own wire protocol.
//!
//! All operations are synchronous and blocking from the caller's
//! perspective; the surrounding shell owns the threading model.

pub mod memory;

pub use memory::MemoryStore;

use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::types::{Reading, RegistryEntry, SensorId, SensorKind, SeriesRow, TimeWindow, Timestamp};

/// Statistical operation executed inside the store, per column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Number of rows in the window
    Count,
    /// Minimum column value in the window
    Min,
    /// Maximum column value in the window
    Max,
    /// Arithmetic mean of the column over the windowed rows
    ///
    /// Named for its role in roll-ups: multiplied by the row count it
    /// recovers the windowed sum, which is what makes cross-series
    /// combination exact.
    WeightedAverage,
    /// Sample standard deviation of the column over the windowed rows
    StdDev,
}

/// Per-sensor time-series storage
///
/// One series per sensor identity, keyed by timestamp, holding readings of
/// exactly one variant. Implementations must report `SchemaMismatch` rather
/// than coerce a write into a series of a different variant.
pub trait SeriesStore: Send + Sync {
    /// Create the series for `id` if absent, or verify its variant
    ///
    /// Idempotent for a matching `kind`; an existing series of a different
    /// variant is a `SchemaMismatch`.
    fn put_series(&self, id: &str, kind: SensorKind) -> Result<(), StorageError>;

    /// Append a reading at `timestamp`; a row already at that key is
    /// overwritten
    fn append(
        &self,
        id: &str,
        timestamp: Timestamp,
        reading: &Reading,
    ) -> Result<(), StorageError>;

    /// Fetch the windowed rows of one series, ordered by timestamp
    fn query(&self, id: &str, window: &TimeWindow) -> Result<Vec<SeriesRow>, StorageError>;

    /// Run a statistical aggregate over one column of the windowed rows
    ///
    /// Returns 0.0 for an empty window.
    fn aggregate(
        &self,
        id: &str,
        window: &TimeWindow,
        column: &str,
        op: AggregateOp,
    ) -> Result<f64, StorageError>;

    /// Bulk-fetch the windowed rows of many series in one call
    ///
    /// Identities without a stored series are omitted from the result, the
    /// same way an empty scan returns no rows. Only backend unavailability
    /// fails the whole call.
    fn multi_get(
        &self,
        predicates: &BTreeMap<SensorId, TimeWindow>,
    ) -> Result<BTreeMap<SensorId, Vec<SeriesRow>>, StorageError>;
}

/// Registry collection storage
///
/// Holds the identity → measurement-type bindings. `put_if_absent` must be
/// atomic per key: under concurrent calls for the same identity exactly one
/// wins, with no read-then-write window.
pub trait RegistryStore: Send + Sync {
    /// Insert the entry unless its identity is already bound
    ///
    /// Returns `true` when this call created the entry, `false` when the
    /// identity was already present (in which case nothing is written).
    fn put_if_absent(&self, entry: RegistryEntry) -> Result<bool, StorageError>;

    /// Fetch the entry for one identity
    fn get(&self, id: &str) -> Result<Option<RegistryEntry>, StorageError>;

    /// Dump every entry, ordered by identity
    fn scan(&self) -> Result<Vec<RegistryEntry>, StorageError>;
}
