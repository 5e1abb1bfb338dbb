//! # Day Buckets
//!
//! Every timestamp is stored as a UTC instant but belongs to a business day
//! on a fixed UTC+5:30 civil calendar.
//!
//! ## Bucketing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UTC instant            + 5:30            Day bucket                    │
//! │  ─────────────────────  ────────────────  ──────────                    │
//! │  2024-01-04T18:29:59Z → 2024-01-04 23:59 → 2024-01-04                  │
//! │  2024-01-04T18:30:00Z → 2024-01-05 00:00 → 2024-01-05                  │
//! │  2024-01-05T12:00:00Z → 2024-01-05 17:30 → 2024-01-05                  │
//! │                                                                         │
//! │  range_of(2024-01-05) = [2024-01-04T18:30:00Z, 2024-01-05T18:30:00Z)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both directions are pure, so `range_of(bucket_of(t))` always contains `t`.
//!
//! ## Usage
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use fuelbook_core::day::{bucket_of, range_of};
//!
//! let t = Utc.with_ymd_and_hms(2024, 1, 4, 18, 30, 0).unwrap();
//! let day = bucket_of(t);
//! assert_eq!(day.to_string(), "2024-01-05");
//!
//! let (start, end) = range_of(day);
//! assert!(start <= t && t < end);
//! ```

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::BUSINESS_UTC_OFFSET_SECS;

const DAY_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// DayKey
// =============================================================================

/// A calendar day on the business calendar.
///
/// Serialized and persisted as `YYYY-MM-DD` text, so lexical order is
/// chronological order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct DayKey(#[ts(as = "String")] NaiveDate);

impl DayKey {
    #[inline]
    pub const fn from_date(date: NaiveDate) -> Self {
        DayKey(date)
    }

    #[inline]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// The day before, or `None` at the start of the calendar.
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(DayKey)
    }

    /// The day after, or `None` at the end of the calendar.
    pub fn next(&self) -> Option<Self> {
        self.0.succ_opt().map(DayKey)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(DayKey)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "day".to_string(),
                reason: "expected YYYY-MM-DD".to_string(),
            })
    }
}

// =============================================================================
// Resolver
// =============================================================================

fn business_offset() -> Duration {
    Duration::seconds(BUSINESS_UTC_OFFSET_SECS)
}

/// Maps a UTC instant onto its business day.
pub fn bucket_of(instant: DateTime<Utc>) -> DayKey {
    DayKey((instant + business_offset()).date_naive())
}

/// Returns the half-open UTC range `[start, end)` covering a business day.
pub fn range_of(day: DayKey) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_midnight = day.0.and_time(NaiveTime::MIN).and_utc();
    let start = local_midnight - business_offset();
    (start, start + Duration::days(1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_local_midnight_boundary() {
        let before = Utc.with_ymd_and_hms(2024, 1, 4, 18, 29, 59).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 4, 18, 30, 0).unwrap();

        assert_eq!(bucket_of(before), day("2024-01-04"));
        assert_eq!(bucket_of(at), day("2024-01-05"));
    }

    #[test]
    fn test_bucket_is_stable() {
        let t = Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap();
        assert_eq!(bucket_of(t), bucket_of(t));
        assert_eq!(bucket_of(t), day("2024-04-01"));
    }

    #[test]
    fn test_range_contains_instant() {
        let instants = [
            Utc.with_ymd_and_hms(2024, 1, 4, 18, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 5, 18, 29, 59).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2023, 12, 31, 18, 30, 0).unwrap(),
        ];

        for t in instants {
            let (start, end) = range_of(bucket_of(t));
            assert!(start <= t && t < end, "{t} outside [{start}, {end})");
            assert_eq!(end - start, Duration::days(1));
        }
    }

    #[test]
    fn test_range_bounds() {
        let (start, end) = range_of(day("2024-01-05"));
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 4, 18, 30, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 5, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_and_neighbours() {
        let d = day("2024-03-01");
        assert_eq!(d.to_string(), "2024-03-01");
        assert_eq!(d.previous(), Some(day("2024-02-29")));
        assert_eq!(d.next(), Some(day("2024-03-02")));
        assert!(day("2024-01-05") < day("2024-01-06"));

        assert!("05/01/2024".parse::<DayKey>().is_err());
        assert!("".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_serializes_as_text() {
        let json = serde_json::to_string(&day("2024-01-05")).unwrap();
        assert_eq!(json, "\"2024-01-05\"");
    }
}
