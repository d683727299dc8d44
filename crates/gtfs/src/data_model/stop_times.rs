use serde::Deserialize;
use utility::time::{deserialize_gtfs_time, GtfsTimeOffset};

/// One row of `stop_times.txt`. Only the columns the resolver actually
/// needs are kept; everything else (headsigns, pickup/drop-off rules,
/// shape distance) has no bearing on computing an arrival.
/// See <https://gtfs.org/schedule/reference/#stop_timestxt>
#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeRow {
    pub trip_id: String,
    pub stop_id: String,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub arrival_time: GtfsTimeOffset,
    pub stop_sequence: i8,
}
