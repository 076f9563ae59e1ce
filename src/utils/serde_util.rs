//! Custom serde helpers for upstream feed wire formats.

/// Below this magnitude an epoch value is read as seconds, above it as milliseconds.
/// 10^11 seconds is year 5138, 10^11 milliseconds is March 1973.
pub const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Converts an epoch value in either seconds or milliseconds to `DateTime<Utc>`.
pub fn epoch_to_datetime(value: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    if value.abs() >= MILLIS_THRESHOLD {
        chrono::DateTime::<chrono::Utc>::from_timestamp_millis(value)
    } else {
        chrono::DateTime::<chrono::Utc>::from_timestamp(value, 0)
    }
}

/// Deserializes an epoch timestamp given in seconds or milliseconds into `DateTime<Utc>`.
///
/// Feeds disagree on the unit and some send floats (`1709251200.5`), so both
/// integer and float JSON numbers are accepted. Fractions are dropped.
pub mod epoch_flexible {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Raw::deserialize(deserializer)? {
            Raw::Int(v) => v,
            Raw::Float(v) => v as i64,
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| serde::de::Error::custom(format!("Invalid timestamp: {}", s)))?,
        };

        super::epoch_to_datetime(value)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp: {}", value)))
    }
}

/// Deserializes an `f64` sent either as a JSON number or as a numeric string.
pub mod number_or_string {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(v),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("Invalid amount: {}", s))),
        }
    }
}
