//! Error types for the telemetry pipeline

use crate::types::SensorKind;
use thiserror::Error;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Payload decoding error
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Storage backend error
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Payload decoding errors
///
/// A decode failure is recovered locally: the offending record is dropped
/// and logged, and batch processing continues with the next record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Payload text is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Payload deserialized to something other than a JSON object
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// Record value carries no `payload` string field
    #[error("record value has no `payload` string field")]
    MissingPayload,

    /// Payload carries no `id` field
    #[error("payload has no `id` string field")]
    MissingId,

    /// A measurement field holds a non-numeric value
    #[error("field `{field}` is not a number")]
    NonNumericField {
        /// Name of the offending field
        field: &'static str,
    },
}

/// Storage backend errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend unreachable; retryable, surfaced to the host
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Series already holds a different variant than the one being written
    ///
    /// Fatal for that write; readings are never coerced across schemas.
    #[error("series `{id}` holds {existing} readings, refusing {incoming} write")]
    SchemaMismatch {
        /// Series (sensor) identity
        id: String,
        /// Variant the series was created with
        existing: SensorKind,
        /// Variant of the rejected write
        incoming: SensorKind,
    },

    /// Requested series does not exist
    #[error("series not found: {0}")]
    SeriesNotFound(String),

    /// Aggregate issued against a column outside the series' schema
    #[error("unknown column `{column}` for {kind} series")]
    UnknownColumn {
        /// Measurement type of the series
        kind: SensorKind,
        /// The unmatched column name
        column: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = StorageError::SchemaMismatch {
            id: "sensor-1".to_string(),
            existing: SensorKind::Light,
            incoming: SensorKind::Power,
        };
        let msg = err.to_string();
        assert!(msg.contains("sensor-1"));
        assert!(msg.contains("light"));
        assert!(msg.contains("watts"));
    }

    #[test]
    fn test_decode_error_wraps_into_error() {
        let err: Error = DecodeError::MissingId.into();
        assert!(matches!(err, Error::Decode(DecodeError::MissingId)));
    }
}
