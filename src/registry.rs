//! Sensor registry: identity → measurement-type bindings
//!
//! Tracks which measurement type each sensor identity reports and when it
//! was first seen. Registration is exactly-once per identity regardless of
//! how many readings arrive for it: the first upsert wins and every later
//! one is an explicit no-op, not an error.

use std::sync::Arc;

use crate::error::StorageError;
use crate::store::RegistryStore;
use crate::types::{RegistryEntry, SensorId, SensorKind, Timestamp};

/// Outcome of a registry upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// This call created the entry
    Inserted,
    /// The identity was already bound; nothing was written
    AlreadyPresent,
}

/// Registry facade over the backing collection store
///
/// Deduplication relies on the store's atomic conditional insert, so
/// first-write-wins holds even under concurrent upserts for the same
/// identity.
#[derive(Clone)]
pub struct SensorRegistry {
    store: Arc<dyn RegistryStore>,
}

impl SensorRegistry {
    /// Create a registry over the given backing store
    pub fn new(store: Arc<dyn RegistryStore>) -> Self {
        Self { store }
    }

    /// Register an identity unless it is already bound
    ///
    /// `timestamp` becomes the entry's `registered_at` only when this call
    /// inserts; an `AlreadyPresent` outcome leaves the stored entry
    /// untouched. Backend unavailability surfaces as a retryable error and
    /// is never swallowed.
    pub fn upsert(
        &self,
        id: &str,
        kind: SensorKind,
        timestamp: Timestamp,
    ) -> Result<UpsertOutcome, StorageError> {
        let inserted = self.store.put_if_absent(RegistryEntry {
            id: id.to_string(),
            kind,
            registered_at: timestamp,
        })?;
        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::AlreadyPresent
        })
    }

    /// Fetch the entry for one identity
    pub fn lookup(&self, id: &str) -> Result<Option<RegistryEntry>, StorageError> {
        self.store.get(id)
    }

    /// Identities registered under the given measurement type
    pub fn list_by_kind(&self, kind: SensorKind) -> Result<Vec<SensorId>, StorageError> {
        Ok(self
            .store
            .scan()?
            .into_iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.id)
            .collect())
    }

    /// Dump every entry, ordered by identity
    pub fn scan(&self) -> Result<Vec<RegistryEntry>, StorageError> {
        self.store.scan()
    }
}
