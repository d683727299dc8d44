use chrono::NaiveDate;
use serde::Deserialize;
use utility::time::deserialize_yyyymmdd;

/// One row of `calendar_dates.txt`: a single-date override of a `Service`.
/// `exception_type` is `1` (service added) or `2` (service removed).
/// See <https://gtfs.org/schedule/reference/#calendar_datestxt>
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDateRow {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_yyyymmdd")]
    pub date: NaiveDate,
    pub exception_type: u8,
}
