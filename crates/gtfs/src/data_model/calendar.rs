use chrono::NaiveDate;
use serde::Deserialize;
use utility::time::deserialize_yyyymmdd;

/// One row of `calendar.txt`: a weekly service pattern within a date
/// window. `monday`..`sunday` are GTFS's `0`/`1` availability flags.
/// See <https://gtfs.org/schedule/reference/#calendartxt>
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRow {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    #[serde(deserialize_with = "deserialize_yyyymmdd")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_yyyymmdd")]
    pub end_date: NaiveDate,
}

impl CalendarRow {
    /// `days[0]` is Monday, matching `model::entities::Service::days`.
    pub fn days(&self) -> [bool; 7] {
        [
            self.monday != 0,
            self.tuesday != 0,
            self.wednesday != 0,
            self.thursday != 0,
            self.friday != 0,
            self.saturday != 0,
            self.sunday != 0,
        ]
    }
}
