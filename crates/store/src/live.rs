//! The live half of the dataset: written by the ingestor once per poll,
//! read by every resolver query in between. Each namespace is a concurrent
//! map so a writer never blocks a reader, and an update to one trip never
//! waits on an update to another.

use dashmap::{DashMap, DashSet};
use model::arrival::{LiveAddition, LiveDelayEntry};

#[derive(Default)]
pub struct LiveData {
    delays: DashMap<String, Vec<LiveDelayEntry>>,
    additions: DashMap<String, Vec<LiveAddition>>,
    cancellations: DashSet<String>,
}

impl LiveData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the delay observations for one trip. Entries must already
    /// be sorted ascending by `stop_sequence` (the resolver's binary search
    /// depends on it).
    pub fn set_delays(&self, trip_id: &str, entries: Vec<LiveDelayEntry>) {
        self.delays.insert(trip_id.to_owned(), entries);
    }

    pub fn delays_for_trip(&self, trip_id: &str) -> Option<Vec<LiveDelayEntry>> {
        self.delays.get(trip_id).map(|entry| entry.value().clone())
    }

    pub fn push_addition(&self, stop_number: &str, addition: LiveAddition) {
        self.additions
            .entry(stop_number.to_owned())
            .or_default()
            .push(addition);
    }

    pub fn additions_for_stop(&self, stop_number: &str) -> Vec<LiveAddition> {
        self.additions
            .get(stop_number)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn cancel(&self, trip_id: &str) {
        self.cancellations.insert(trip_id.to_owned());
    }

    pub fn is_cancelled(&self, trip_id: &str) -> bool {
        self.cancellations.contains(trip_id)
    }

    /// Clears every live namespace. Called at the start of each ingest
    /// pass is deliberately NOT done here: a pass overwrites per-trip
    /// entries it has fresh data for and leaves the rest untouched, so a
    /// slow-moving trip's last known delay is still usable between polls.
    pub fn clear(&self) {
        self.delays.clear();
        self.additions.clear();
        self.cancellations.clear();
    }
}
