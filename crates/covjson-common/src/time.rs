//! Time handling utilities for coverage `t` axes.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Parse an ISO 8601 timestamp as found on CoverageJSON `t` axes.
///
/// Supports:
/// - RFC 3339: "2024-01-15T12:00:00Z", "2024-01-15T12:00:00+02:00"
/// - Minute precision: "2022-07-12T16:00Z"
/// - No timezone (assumed UTC): "2024-01-15T12:00:00", "2024-01-15T12:00:00.5"
/// - Date only: "2024-01-15"
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s.strip_suffix('Z').unwrap_or(s);
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// A closed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window of width `step` centered on `t`.
    ///
    /// Each half is truncated to whole seconds, so an odd step in seconds
    /// yields a window one second shorter than `step`.
    pub fn centered_on(t: DateTime<Utc>, step: Duration) -> Self {
        let half = Duration::seconds(step.num_seconds() / 2);
        Self {
            start: t - half,
            end: t + half,
        }
    }

    /// Grow this range so it also covers `other`.
    pub fn extend(&mut self, other: &TimeRange) {
        if other.start < self.start {
            self.start = other.start;
        }
        if other.end > self.end {
            self.end = other.end;
        }
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}
