//! Last-modified time windows
//!
//! Query-string bounds arrive as loosely formatted ISO 8601 text. A missing
//! or unparsable bound yields no window at all, which callers treat as an
//! empty result rather than an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive formats tried after RFC 3339; naive values are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// An inclusive `[start, end]` range over `last_timestamp`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Builds a window from raw query parameters
    ///
    /// Returns `None` when either bound is absent, blank or unparsable.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        let start = parse_timestamp(start?)?;
        let end = parse_timestamp(end?)?;
        Some(Self { start, end })
    }

    /// Inclusive on both ends; a reversed window contains nothing
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Parses RFC 3339, naive date-time, or bare date (midnight UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
