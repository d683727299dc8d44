//! Static GTFS entities, as held by the store once a feed has been loaded.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A transit operator. `agency.txt` in the source feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub agency_id: String,
    pub agency_name: String,
}

/// A published line. `routes.txt` in the source feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub agency_id: String,
    pub short_name: String,
}

/// A weekly service pattern within a date window. `calendar.txt`.
///
/// `days[0]` is Monday, matching `chrono::Weekday::num_days_from_monday`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub service_id: String,
    pub days: [bool; 7],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Service {
    /// Whether the base weekly pattern runs on `date`, ignoring exceptions.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date || date > self.end_date {
            return false;
        }
        self.days[weekday_index(date.weekday())]
    }
}

fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_monday() as usize
}

/// A single-date override of a `Service`. `calendar_dates.txt`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExceptionType {
    Added,
    Removed,
}

impl ExceptionType {
    pub fn from_gtfs_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Added),
            2 => Some(Self::Removed),
            _ => None,
        }
    }
}

/// A physical stop. `stops.txt`. `stop_number` is the rider-facing code
/// printed on the pole; it falls back to `stop_id` when the feed leaves the
/// column blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    pub stop_number: String,
}

/// The joined view the resolver needs about one trip: its route, agency and
/// service, assembled by following the foreign keys out of a `Trip` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripInfo {
    pub route_short_name: String,
    pub agency_name: String,
    pub service_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: [bool; 7],
}
