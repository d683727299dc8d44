pub mod agency;
pub mod calendar;
pub mod calendar_dates;
pub mod routes;
pub mod stop_times;
pub mod stops;
pub mod trips;

/// Generated GTFS-realtime protobuf bindings, compiled from
/// `protobuf/gtfs-realtime.proto` by `build.rs`.
pub mod realtime {
    include!(concat!(env!("OUT_DIR"), "/protobuf/transit_realtime.rs"));
}
