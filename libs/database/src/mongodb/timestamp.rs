//! Timestamps stored as fixed-width ISO 8601 strings with millisecond
//! precision (`2024-05-01T10:00:00.000Z`).
//!
//! Every stored value has the same width and a `Z` suffix, so string order in
//! MongoDB matches time order and `$gte`/`$lte` range filters work on the raw
//! field. Use with `#[serde(with = "database::mongodb::timestamp")]`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Canonical stored form of `dt`, also used for query bounds.
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(dt))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}
