//! Live-update values and the resolver's output type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One observation carried by a GTFS-realtime `trip_update`, attached to a
/// particular stop within that trip.
///
/// `delay` is `None` when the upstream update carried an absolute
/// `arrival_time` instead of a delay offset; such an entry still takes part
/// in the stop-sequence binary search but contributes no delay of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveDelayEntry {
    pub stop_sequence: i8,
    pub delay: Option<i32>,
    pub observed_at: i64,
}

/// An unscheduled trip reported only by the live feed, reported for a given
/// stop number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveAddition {
    pub route_id: String,
    pub arrival_time: NaiveDateTime,
    pub observed_at: i64,
}

/// One row of the resolver's answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arrival {
    pub route: String,
    pub agency: String,
    pub scheduled_arrival: NaiveDateTime,
    pub real_time_arrival: Option<NaiveDateTime>,
}

impl Arrival {
    /// The instant the caller should actually sort and filter on: the live
    /// estimate when one exists, otherwise the timetable.
    pub fn effective_arrival(&self) -> NaiveDateTime {
        self.real_time_arrival.unwrap_or(self.scheduled_arrival)
    }
}
