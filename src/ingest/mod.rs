//! Ingestion path: transport records → classified readings → storage
//!
//! The external stream host delivers batches of [`SinkRecord`]s; the
//! [`Dispatcher`](dispatcher::Dispatcher) classifies each payload via
//! [`classify`](classify::classify), appends the typed reading to the
//! sensor's series, and upserts the registry. Per-record failures are
//! isolated: a malformed payload never aborts the batch it arrived in.

pub mod classify;
pub mod dispatcher;

pub use classify::{classify, ClassifiedPayload};
pub use dispatcher::{BatchReport, Dispatcher, SkippedRecord};

use serde::Deserialize;

use crate::error::DecodeError;
use crate::types::Timestamp;

/// One record as delivered by the stream-processing host
///
/// The `value` is the host's opaque envelope and must deserialize to a map
/// carrying a `payload` string field with the sensor JSON inside.
/// `timestamp` is the delivery timestamp the host stamped on the record; it
/// becomes the series row key, decoupling storage order from payload
/// content.
#[derive(Debug, Clone, Deserialize)]
pub struct SinkRecord {
    /// Partition-agnostic record key, if the host set one
    #[serde(default)]
    pub key: Option<String>,
    /// Opaque value envelope
    pub value: serde_json::Value,
    /// Delivery timestamp in epoch milliseconds
    pub timestamp: Timestamp,
}

impl SinkRecord {
    /// Extract the inner payload string from the value envelope
    pub fn payload(&self) -> Result<&str, DecodeError> {
        self.value
            .as_object()
            .ok_or(DecodeError::NotAnObject)?
            .get("payload")
            .and_then(|v| v.as_str())
            .ok_or(DecodeError::MissingPayload)
    }
}
