//! Date range type for calendar queries.
//!
//! This module provides [`DateRange`], the closed `[from, to]` interval a
//! calendar is resolved against. All instants are stored in UTC; timezone
//! conversion is the caller's concern.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// A closed date range `[from, to]` in UTC.
///
/// Both ends are inclusive: an event overlaps the range when it starts no
/// later than `to` and ends no earlier than `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawDateRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = RangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.from, raw.to)
    }
}

impl DateRange {
    /// Creates a new date range.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::InvalidRange`] if `from` is after `to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, RangeError> {
        if from > to {
            return Err(RangeError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Returns the inclusive start of the range.
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Returns the inclusive end of the range.
    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Returns the length of the range.
    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// Checks if an instant falls within the range (both ends inclusive).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }

    /// Checks if the closed interval `[start, end]` intersects this range.
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.to && end >= self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn creation() {
        let range = DateRange::new(utc(2025, 1, 1, 0, 0, 0), utc(2025, 1, 31, 0, 0, 0)).unwrap();
        assert_eq!(range.from(), utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(range.to(), utc(2025, 1, 31, 0, 0, 0));
        assert_eq!(range.duration(), Duration::days(30));
    }

    #[test]
    fn single_instant_range_is_valid() {
        let instant = utc(2025, 1, 1, 12, 0, 0);
        let range = DateRange::new(instant, instant).unwrap();
        assert!(range.contains(instant));
        assert_eq!(range.duration(), Duration::zero());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateRange::new(utc(2025, 1, 31, 0, 0, 0), utc(2025, 1, 1, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, RangeError::InvalidRange { .. }));
    }

    #[test]
    fn intersects_is_inclusive_on_both_ends() {
        let range = DateRange::new(utc(2025, 1, 10, 0, 0, 0), utc(2025, 1, 20, 0, 0, 0)).unwrap();

        // Fully inside
        assert!(range.intersects(utc(2025, 1, 12, 0, 0, 0), utc(2025, 1, 13, 0, 0, 0)));
        // Ends exactly at range start
        assert!(range.intersects(utc(2025, 1, 9, 0, 0, 0), utc(2025, 1, 10, 0, 0, 0)));
        // Starts exactly at range end
        assert!(range.intersects(utc(2025, 1, 20, 0, 0, 0), utc(2025, 1, 21, 0, 0, 0)));
        // Spans the whole range
        assert!(range.intersects(utc(2025, 1, 1, 0, 0, 0), utc(2025, 2, 1, 0, 0, 0)));

        // Entirely before
        assert!(!range.intersects(utc(2025, 1, 8, 0, 0, 0), utc(2025, 1, 9, 23, 59, 59)));
        // Entirely after
        assert!(!range.intersects(utc(2025, 1, 20, 0, 0, 1), utc(2025, 1, 21, 0, 0, 0)));
    }

    #[test]
    fn serde_roundtrip() {
        let range = DateRange::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0)).unwrap();
        let json = serde_json::to_string(&range).unwrap();
        let parsed: DateRange = serde_json::from_str(&json).unwrap();
        assert_eq!(range, parsed);
    }

    #[test]
    fn deserialize_rejects_inverted_range() {
        let json = r#"{"from":"2025-02-05T17:00:00Z","to":"2025-02-05T09:00:00Z"}"#;
        assert!(serde_json::from_str::<DateRange>(json).is_err());
    }
}
