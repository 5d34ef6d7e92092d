//! Ingestion dispatcher: drains record batches into series and registry
//!
//! Records are processed sequentially in delivery order. Each record
//! produces at most one series append and at most one registry insert; a
//! record that fails to decode is logged and dropped without disturbing the
//! rest of the batch. Only backend unavailability aborts the batch and
//! propagates to the host, which owns the retry policy.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::classify::classify;
use super::SinkRecord;
use crate::error::{Error, StorageError};
use crate::registry::{SensorRegistry, UpsertOutcome};
use crate::store::SeriesStore;

/// Summary of one batch's processing, returned to the host
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Records examined
    pub processed: usize,
    /// Series rows written
    pub appended: usize,
    /// New registry entries created
    pub registered: usize,
    /// Upserts that found the identity already bound (ignorable)
    pub duplicates: usize,
    /// Records dropped with their reasons
    pub skipped: Vec<SkippedRecord>,
}

/// A record that was dropped during batch processing
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    /// Position of the record within its batch
    pub index: usize,
    /// Record key, if the host set one
    pub key: Option<String>,
    /// Human-readable reason the record was dropped
    pub reason: String,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} records: {} appended, {} registered, {} duplicates, {} skipped",
            self.processed,
            self.appended,
            self.registered,
            self.duplicates,
            self.skipped.len()
        )
    }
}

/// What one successfully processed record did
struct RecordEffects {
    appended: bool,
    registration: UpsertOutcome,
}

/// Write-path entry point consuming host-delivered record batches
pub struct Dispatcher {
    series: Arc<dyn SeriesStore>,
    registry: SensorRegistry,
}

impl Dispatcher {
    /// Create a dispatcher over the given series store and registry
    pub fn new(series: Arc<dyn SeriesStore>, registry: SensorRegistry) -> Self {
        Self { series, registry }
    }

    /// Process one batch of records in delivery order
    ///
    /// Per-record failures (decode errors, schema mismatches) are isolated:
    /// the record is logged, counted in the report, and the loop continues.
    /// `StorageError::Unavailable` aborts the batch immediately.
    pub fn process_batch(&self, records: &[SinkRecord]) -> Result<BatchReport, StorageError> {
        let mut report = BatchReport::default();

        for (index, record) in records.iter().enumerate() {
            report.processed += 1;
            match self.process_record(record) {
                Ok(effects) => {
                    if effects.appended {
                        report.appended += 1;
                    }
                    match effects.registration {
                        UpsertOutcome::Inserted => report.registered += 1,
                        UpsertOutcome::AlreadyPresent => report.duplicates += 1,
                    }
                },
                Err(Error::Storage(StorageError::Unavailable(message))) => {
                    return Err(StorageError::Unavailable(message));
                },
                Err(err) => {
                    warn!(index, error = %err, "skipping record");
                    report.skipped.push(SkippedRecord {
                        index,
                        key: record.key.clone(),
                        reason: err.to_string(),
                    });
                },
            }
        }

        debug!(%report, "batch complete");
        Ok(report)
    }

    /// Decode, classify, append, and register a single record
    fn process_record(&self, record: &SinkRecord) -> Result<RecordEffects, Error> {
        let payload = record.payload()?;
        let classified = classify(payload)?;

        // Descriptor-only payloads update the registry without appending
        let appended = match classified.reading {
            Some(reading) => {
                self.series.put_series(&classified.id, classified.kind)?;
                self.series
                    .append(&classified.id, record.timestamp, &reading)?;
                debug!(
                    sensor = %classified.id,
                    timestamp = record.timestamp,
                    "appended {reading}"
                );
                true
            },
            None => false,
        };

        let registration = self
            .registry
            .upsert(&classified.id, classified.kind, record.timestamp)?;
        match registration {
            UpsertOutcome::Inserted => {
                debug!(sensor = %classified.id, kind = %classified.kind, "registered sensor");
            },
            UpsertOutcome::AlreadyPresent => {
                debug!(sensor = %classified.id, "ignoring duplicate registration");
            },
        }

        Ok(RecordEffects {
            appended,
            registration,
        })
    }
}
