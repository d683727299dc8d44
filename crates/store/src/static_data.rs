//! The static half of the dataset: everything produced by one pass of the
//! loader, published atomically so that concurrent readers never observe a
//! half-built timetable.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use arc_swap::ArcSwap;
use chrono::NaiveDate;
use model::entities::{Agency, ExceptionType, Route, Service, Stop};
use model::packed::{PackedStopTime, PackedTrip};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Key for a stop-time bucket: a stop number and an hour-of-day (0-23, the
/// GTFS raw hour taken modulo 24 so that post-midnight trips still land in
/// the bucket a rider would look under).
pub type BucketKey = (String, u8);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticData {
    pub agencies: HashMap<String, Agency>,
    pub routes: HashMap<String, Route>,
    pub services: HashMap<String, Service>,
    pub exceptions: HashMap<(String, NaiveDate), ExceptionType>,
    pub stops: HashMap<String, Stop>,
    pub stop_numbers: HashSet<String>,
    pub trips: HashMap<String, PackedTrip>,
    pub stop_time_buckets: HashMap<BucketKey, Vec<PackedStopTime>>,
}

impl StaticData {
    pub fn is_valid_stop_number(&self, stop_number: &str) -> bool {
        self.stop_numbers.contains(stop_number)
    }
}

/// Writes `data` to `path` as `bincode`, via a temp-file-then-rename so a
/// reader never observes a partially-written snapshot.
pub fn write_snapshot(data: &StaticData, path: &Path) -> StoreResult<()> {
    let bytes = bincode::serialize(data).map_err(|why| StoreError::Backend(why.to_string()))?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes).map_err(|why| StoreError::Backend(why.to_string()))?;
    fs::rename(&tmp_path, path).map_err(|why| StoreError::Backend(why.to_string()))?;
    Ok(())
}

/// Loads a snapshot written by [`write_snapshot`]. Returns `Ok(None)` (not
/// an error) when `path` does not exist, so a first-run deployment falls
/// through to the CSV loader.
pub fn load_snapshot(path: &Path) -> StoreResult<Option<StaticData>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(|why| StoreError::Backend(why.to_string()))?;
    bincode::deserialize(&bytes)
        .map(Some)
        .map_err(|why| StoreError::Backend(why.to_string()))
}

/// An atomically-swappable handle to the current [`StaticData`]. A static
/// refresh builds a brand new `StaticData` off to the side and publishes it
/// with one `store`, so readers either see the old dataset in full or the
/// new one in full, never a mix.
#[derive(Default)]
pub struct StaticDataHandle(ArcSwap<StaticData>);

impl StaticDataHandle {
    pub fn new(initial: StaticData) -> Self {
        Self(ArcSwap::new(std::sync::Arc::new(initial)))
    }

    pub fn load(&self) -> std::sync::Arc<StaticData> {
        self.0.load_full()
    }

    pub fn publish(&self, data: StaticData) {
        self.0.store(std::sync::Arc::new(data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_replaces_the_whole_snapshot_atomically() {
        let handle = StaticDataHandle::new(StaticData::default());
        assert!(!handle.load().is_valid_stop_number("1358"));

        let mut next = StaticData::default();
        next.stop_numbers.insert("1358".to_owned());
        handle.publish(next);

        assert!(handle.load().is_valid_stop_number("1358"));
    }

    #[test]
    fn snapshot_round_trips_static_data() {
        let mut data = StaticData::default();
        data.stop_numbers.insert("1358".to_owned());
        data.trips.insert("t1".to_owned(), PackedTrip::pack("49", "180"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.snapshot");
        write_snapshot(&data, &path).unwrap();

        let restored = load_snapshot(&path).unwrap().unwrap();
        assert!(restored.is_valid_stop_number("1358"));
        assert_eq!(restored.trips.get("t1").unwrap().unpack(), ("49".to_owned(), "180".to_owned()));
    }

    #[test]
    fn loading_a_missing_snapshot_returns_none() {
        assert!(load_snapshot(Path::new("/nonexistent/store.snapshot")).unwrap().is_none());
    }
}
