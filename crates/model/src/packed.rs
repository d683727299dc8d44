//! Fixed-width binary records for trips and stop-times.
//!
//! A transit network's `stop_times.txt` can run into the tens of millions of
//! rows; holding each as a heap-allocated struct would dominate memory use.
//! Both records below are exactly 16 bytes and pack/unpack losslessly.

use serde::{Deserialize, Serialize};
use utility::bytes::{pack_fixed, unpack_fixed};

/// `route_id` (12 bytes) + `service_id` (4 bytes), zero-padded UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedTrip {
    route_id: [u8; 12],
    service_id: [u8; 4],
}

impl PackedTrip {
    pub fn pack(route_id: &str, service_id: &str) -> Self {
        Self {
            route_id: pack_fixed(route_id),
            service_id: pack_fixed(service_id),
        }
    }

    pub fn unpack(&self) -> (String, String) {
        (unpack_fixed(&self.route_id), unpack_fixed(&self.service_id))
    }

    pub fn to_bytes(self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[..12].copy_from_slice(&self.route_id);
        buf[12..].copy_from_slice(&self.service_id);
        buf
    }

    pub fn from_bytes(buf: [u8; 16]) -> Self {
        let mut route_id = [0u8; 12];
        let mut service_id = [0u8; 4];
        route_id.copy_from_slice(&buf[..12]);
        service_id.copy_from_slice(&buf[12..]);
        Self {
            route_id,
            service_id,
        }
    }
}

/// `trip_id` (12 bytes) + `arrival_h`/`arrival_m`/`arrival_s`/`stop_sequence`
/// (one signed byte each).
///
/// `arrival_h` is stored exactly as read off the feed and may exceed `23`
/// for trips that run past midnight (GTFS encodes `01:10:00` the next day
/// as `25:10:00`); callers apply rollover rules when turning this into a
/// wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedStopTime {
    trip_id: [u8; 12],
    pub arrival_h: i8,
    pub arrival_m: i8,
    pub arrival_s: i8,
    pub stop_sequence: i8,
}

impl PackedStopTime {
    pub fn pack(trip_id: &str, arrival_h: i8, arrival_m: i8, arrival_s: i8, stop_sequence: i8) -> Self {
        Self {
            trip_id: pack_fixed(trip_id),
            arrival_h,
            arrival_m,
            arrival_s,
            stop_sequence,
        }
    }

    pub fn trip_id(&self) -> String {
        unpack_fixed(&self.trip_id)
    }

    pub fn to_bytes(self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[..12].copy_from_slice(&self.trip_id);
        buf[12] = self.arrival_h as u8;
        buf[13] = self.arrival_m as u8;
        buf[14] = self.arrival_s as u8;
        buf[15] = self.stop_sequence as u8;
        buf
    }

    pub fn from_bytes(buf: [u8; 16]) -> Self {
        let mut trip_id = [0u8; 12];
        trip_id.copy_from_slice(&buf[..12]);
        Self {
            trip_id,
            arrival_h: buf[12] as i8,
            arrival_m: buf[13] as i8,
            arrival_s: buf[14] as i8,
            stop_sequence: buf[15] as i8,
        }
    }
}
