//! Schema classification for inbound sensor payloads
//!
//! Pure mapping from a raw JSON payload to its measurement type and, when
//! measurement fields are present, a fully populated [`Reading`].
//!
//! Classification is by substring containment on the payload text, tried in
//! a fixed priority order: a `light` token wins over a `watts` token, and
//! the electricity variant is the default when neither matches. The order is
//! load-bearing — a payload can contain more than one token — and must not
//! be reordered.

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::{Reading, SensorId, SensorKind};

/// A decoded and classified payload
///
/// `reading` is `None` for descriptor-only payloads (the companion registry
/// messages that announce a sensor's type without carrying measurements);
/// those update the registry but append nothing to the series.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPayload {
    /// Sensor identity from the payload's `id` field
    pub id: SensorId,
    /// Measurement type chosen by the token scan
    pub kind: SensorKind,
    /// The typed reading, when measurement fields were present
    pub reading: Option<Reading>,
}

/// Decode a payload string and classify it
///
/// Fails with a [`DecodeError`] on malformed input; no partial result is
/// produced. Side-effect free.
pub fn classify(raw: &str) -> Result<ClassifiedPayload, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    let fields = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let id = fields
        .get("id")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingId)?
        .to_string();

    let kind = classify_kind(raw);
    let reading = decode_reading(fields, kind)?;

    Ok(ClassifiedPayload { id, kind, reading })
}

/// Token scan in fixed priority order; first match wins
fn classify_kind(raw: &str) -> SensorKind {
    if raw.contains("light") {
        SensorKind::Light
    } else if raw.contains("watts") {
        SensorKind::Power
    } else {
        SensorKind::Electricity
    }
}

/// Decode the chosen variant's measurement fields, if any are present
///
/// A missing partner field defaults to 0.0, matching the upstream decoder's
/// behavior for sparse payloads. Both fields absent means descriptor-only.
fn decode_reading(
    fields: &Map<String, Value>,
    kind: SensorKind,
) -> Result<Option<Reading>, DecodeError> {
    let [first, second] = kind.columns();
    let a = numeric_field(fields, first)?;
    let b = numeric_field(fields, second)?;
    match (a, b) {
        (None, None) => Ok(None),
        _ => Ok(Some(Reading::from_columns(
            kind,
            a.unwrap_or(0.0),
            b.unwrap_or(0.0),
        ))),
    }
}

fn numeric_field(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<f64>, DecodeError> {
    match fields.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(DecodeError::NonNumericField { field: name }),
    }
}
