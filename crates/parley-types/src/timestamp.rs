use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Point in time carried by `created_at` / `updated_at`.
///
/// A decoded timestamp keeps the producer's exact string and writes it back
/// unchanged, so `2024-05-01T12:00:00.000Z` stays byte-identical through a
/// decode/encode cycle. Values built in Rust are written as RFC 3339 in UTC
/// with millisecond precision (`2024-05-01T12:00:00.000Z`), the same shape
/// the producer emits.
///
/// Equality, ordering and hashing only look at the instant.
#[derive(Debug, Clone)]
pub struct Timestamp {
    at: DateTime<Utc>,
    raw: Option<String>,
}

/// SQLite `datetime('now')` output, no zone, always UTC.
const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self { at, raw: None }
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.at
    }

    /// Normalized UTC form, regardless of how the value was received.
    pub fn to_rfc3339(&self) -> String {
        self.at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The string this timestamp is encoded as.
    pub fn as_wire(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => self.to_rfc3339(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let at = DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|err| {
                NaiveDateTime::parse_from_str(s, SQLITE_FORMAT)
                    .map(|ndt| ndt.and_utc())
                    // Surface the RFC 3339 error.
                    .map_err(|_| err)
            })?;

        Ok(Self {
            at,
            raw: Some(s.to_string()),
        })
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at)
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.at.hash(state);
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_wire())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
