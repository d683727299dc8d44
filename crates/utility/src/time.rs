//! GTFS time and date parsing helpers.
//!
//! GTFS represents a time of day as `HH:MM:SS` where `HH` may exceed `23` to
//! denote service past midnight (e.g. `25:10:00` for 01:10 the next day).
//! Dates are `YYYYMMDD` with no separators.

use chrono::{Duration, NaiveDate};
use serde::{de::Error as DeError, Deserialize, Deserializer};

/// An offset from midnight as parsed straight out of a GTFS `HH:MM:SS`
/// field. `hours` is kept un-normalized (it may be `>= 24`) so that callers
/// can apply their own rollover rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GtfsTimeOffset {
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
}

impl GtfsTimeOffset {
    pub fn new(hours: i32, minutes: i32, seconds: i32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// Parses a GTFS `HH:MM:SS` field. Returns `None` on malformed input.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().splitn(3, ':');
        let hours: i32 = parts.next()?.parse().ok()?;
        let minutes: i32 = parts.next()?.parse().ok()?;
        let seconds: i32 = parts.next()?.parse().ok()?;
        Some(Self::new(hours, minutes, seconds))
    }

    pub fn to_duration(self) -> Duration {
        Duration::hours(self.hours as i64)
            + Duration::minutes(self.minutes as i64)
            + Duration::seconds(self.seconds as i64)
    }
}

/// Parses a `YYYYMMDD` GTFS date field.
pub fn parse_yyyymmdd(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}

/// A `serde(deserialize_with = ...)` helper for CSV columns holding a GTFS
/// `HH:MM:SS` field.
pub fn deserialize_gtfs_time<'de, D>(deserializer: D) -> Result<GtfsTimeOffset, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    GtfsTimeOffset::parse(&raw)
        .ok_or_else(|| DeError::custom(format!("invalid GTFS time {raw:?}")))
}

/// A `serde(deserialize_with = ...)` helper for CSV columns holding a GTFS
/// `YYYYMMDD` date field.
pub fn deserialize_yyyymmdd<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_yyyymmdd(&raw).ok_or_else(|| DeError::custom(format!("invalid GTFS date {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ordinary_time() {
        let t = GtfsTimeOffset::parse("09:15:50").unwrap();
        assert_eq!(t, GtfsTimeOffset::new(9, 15, 50));
    }

    #[test]
    fn parses_past_midnight_time() {
        let t = GtfsTimeOffset::parse("25:10:00").unwrap();
        assert_eq!(t.hours, 25);
        assert_eq!(t.to_duration(), Duration::hours(25) + Duration::minutes(10));
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(GtfsTimeOffset::parse("09:15").is_none());
        assert!(GtfsTimeOffset::parse("not-a-time").is_none());
    }

    #[test]
    fn parses_date() {
        assert_eq!(
            parse_yyyymmdd("20230915"),
            NaiveDate::from_ymd_opt(2023, 9, 15)
        );
        assert_eq!(parse_yyyymmdd("bogus"), None);
    }
}
