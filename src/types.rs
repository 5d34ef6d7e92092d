//! Core data types shared by the ingestion and query paths
//!
//! # Key Types
//!
//! - **`SensorKind`**: The fixed set of measurement types (light, watts, volts)
//! - **`Reading`**: A single typed measurement (two numeric columns per variant)
//! - **`RegistryEntry`**: Identity → measurement-type binding, first write wins
//! - **`SeriesRow`**: One timestamped reading inside a per-sensor series
//! - **`TimeWindow`**: Inclusive, optionally unbounded time range for queries
//!
//! # Example
//!
//! ```rust
//! use teleseries::types::{Reading, SensorKind, TimeWindow};
//!
//! let reading = Reading::Light { light: 12.5, sound: 0.3 };
//! assert_eq!(reading.kind(), SensorKind::Light);
//! assert_eq!(reading.value("sound"), Some(0.3));
//!
//! let window = TimeWindow::between(1_000, 2_000);
//! assert!(window.contains(1_000));
//! assert!(!window.contains(2_001));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identity of a sensor device, as reported in its payloads
///
/// Doubles as the name of the sensor's series in the backing store.
pub type SensorId = String;

/// Unix timestamp in milliseconds since epoch (1970-01-01 00:00:00 UTC)
///
/// Assigned by the transport layer at delivery time, never parsed out of
/// payload content.
pub type Timestamp = i64;

/// The fixed set of sensor measurement types
///
/// Each kind owns a two-column schema; a series holds readings of exactly
/// one kind. The wire-level type tokens (`light`, `watts`, `volts`) are the
/// strings the classifier scans payloads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Measures light and sound
    Light,
    /// Measures power draw (watts) and heat
    Power,
    /// Measures volts and amps
    Electricity,
}

impl SensorKind {
    /// Every kind, in classification priority order
    pub const ALL: [SensorKind; 3] = [
        SensorKind::Light,
        SensorKind::Power,
        SensorKind::Electricity,
    ];

    /// The wire-level type token for this kind
    ///
    /// Also the name of the kind's leading column, which is what the count
    /// aggregate is issued against.
    pub fn token(&self) -> &'static str {
        match self {
            SensorKind::Light => "light",
            SensorKind::Power => "watts",
            SensorKind::Electricity => "volts",
        }
    }

    /// Column names of this kind's schema (timestamp key excluded)
    pub fn columns(&self) -> [&'static str; 2] {
        match self {
            SensorKind::Light => ["light", "sound"],
            SensorKind::Power => ["watts", "heat"],
            SensorKind::Electricity => ["volts", "amps"],
        }
    }

    /// Parse a kind from its wire token
    ///
    /// ```rust
    /// use teleseries::types::SensorKind;
    ///
    /// assert_eq!(SensorKind::parse("watts"), Some(SensorKind::Power));
    /// assert_eq!(SensorKind::parse("humidity"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(SensorKind::Light),
            "watts" => Some(SensorKind::Power),
            "volts" => Some(SensorKind::Electricity),
            _ => None,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// A single typed sensor measurement
///
/// Tagged union over the three schemas; the variant is fixed at the series'
/// first write and never mixed within one series. All measurement fields are
/// IEEE 754 doubles, matching the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Reading {
    /// Light/sound measurement
    Light {
        /// Light level
        light: f64,
        /// Sound level
        sound: f64,
    },
    /// Power/heat measurement
    Power {
        /// Power draw in watts
        watts: f64,
        /// Heat level
        heat: f64,
    },
    /// Volts/amps measurement
    Electricity {
        /// Voltage
        volts: f64,
        /// Current in amps
        amps: f64,
    },
}

impl Reading {
    /// Build a reading of the given kind from its two column values, in
    /// schema order
    pub fn from_columns(kind: SensorKind, first: f64, second: f64) -> Self {
        match kind {
            SensorKind::Light => Reading::Light {
                light: first,
                sound: second,
            },
            SensorKind::Power => Reading::Power {
                watts: first,
                heat: second,
            },
            SensorKind::Electricity => Reading::Electricity {
                volts: first,
                amps: second,
            },
        }
    }

    /// The measurement type this reading belongs to
    pub fn kind(&self) -> SensorKind {
        match self {
            Reading::Light { .. } => SensorKind::Light,
            Reading::Power { .. } => SensorKind::Power,
            Reading::Electricity { .. } => SensorKind::Electricity,
        }
    }

    /// Column names of this reading's schema
    pub fn columns(&self) -> [&'static str; 2] {
        self.kind().columns()
    }

    /// Column values in schema order
    pub fn values(&self) -> [f64; 2] {
        match *self {
            Reading::Light { light, sound } => [light, sound],
            Reading::Power { watts, heat } => [watts, heat],
            Reading::Electricity { volts, amps } => [volts, amps],
        }
    }

    /// Look up a column value by name, `None` for columns outside this schema
    pub fn value(&self, column: &str) -> Option<f64> {
        let [a, b] = self.columns();
        let [va, vb] = self.values();
        if column == a {
            Some(va)
        } else if column == b {
            Some(vb)
        } else {
            None
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.columns();
        let [va, vb] = self.values();
        write!(f, "{}: {} {}: {}", a, va, b, vb)
    }
}

/// Registry binding from sensor identity to its measurement type
///
/// At most one entry exists per identity. Once written, `kind` and
/// `registered_at` are immutable: the first registration wins and every
/// later attempt is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Sensor identity (unique key)
    pub id: SensorId,
    /// Measurement type, fixed for the sensor's lifetime
    pub kind: SensorKind,
    /// Delivery timestamp of the record that first registered the sensor
    pub registered_at: Timestamp,
}

/// One row of a per-sensor series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Row key; unique within the series, later writes overwrite
    pub timestamp: Timestamp,
    /// The typed measurement stored at this timestamp
    pub reading: Reading,
}

/// Inclusive time window, optionally unbounded on either side
///
/// `None` on a bound means no constraint on that side. Used as the
/// per-identity selection predicate on the read path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start timestamp (inclusive), `None` = from the earliest row
    pub start: Option<Timestamp>,
    /// End timestamp (inclusive), `None` = to the latest row
    pub end: Option<Timestamp>,
}

impl TimeWindow {
    /// Window with both bounds set
    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Window with no bounds (selects every row)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check whether a timestamp falls inside the window (bounds inclusive)
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.start.map_or(true, |start| start <= timestamp)
            && self.end.map_or(true, |end| end >= timestamp)
    }

    /// True when `start > end` makes the window select nothing
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tokens_and_columns() {
        assert_eq!(SensorKind::Light.token(), "light");
        assert_eq!(SensorKind::Power.columns(), ["watts", "heat"]);
        assert_eq!(SensorKind::Electricity.columns(), ["volts", "amps"]);

        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::parse(kind.token()), Some(kind));
            // The count column is always the schema's leading column
            assert_eq!(kind.columns()[0], kind.token());
        }
        assert_eq!(SensorKind::parse("pressure"), None);
    }

    #[test]
    fn test_reading_round_trip_columns() {
        let reading = Reading::from_columns(SensorKind::Power, 5.0, 1.5);
        assert_eq!(reading.kind(), SensorKind::Power);
        assert_eq!(reading.value("watts"), Some(5.0));
        assert_eq!(reading.value("heat"), Some(1.5));
        assert_eq!(reading.value("light"), None);
    }

    #[test]
    fn test_time_window_bounds_inclusive() {
        let window = TimeWindow::between(100, 200);
        assert!(window.contains(100));
        assert!(window.contains(150));
        assert!(window.contains(200));
        assert!(!window.contains(99));
        assert!(!window.contains(201));
    }

    #[test]
    fn test_time_window_unbounded_sides() {
        let window = TimeWindow {
            start: None,
            end: Some(500),
        };
        assert!(window.contains(i64::MIN));
        assert!(window.contains(500));
        assert!(!window.contains(501));

        assert!(TimeWindow::unbounded().contains(0));
        assert!(TimeWindow::unbounded().contains(i64::MAX));
    }

    #[test]
    fn test_time_window_inverted() {
        assert!(TimeWindow::between(200, 100).is_inverted());
        assert!(!TimeWindow::between(100, 200).is_inverted());
        assert!(!TimeWindow::unbounded().is_inverted());
    }
}
