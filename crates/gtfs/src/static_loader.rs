//! One-shot CSV ingest of a static GTFS feed into a [`StaticData`] snapshot.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use csv::ReaderBuilder;
use model::entities::{Agency, ExceptionType, Route, Service, Stop};
use model::packed::{PackedStopTime, PackedTrip};
use store::static_data::StaticData;

use crate::data_model::agency::AgencyRow;
use crate::data_model::calendar::CalendarRow;
use crate::data_model::calendar_dates::CalendarDateRow;
use crate::data_model::routes::RouteRow;
use crate::data_model::stop_times::StopTimeRow;
use crate::data_model::stops::StopRow;
use crate::data_model::trips::TripRow;
use crate::error::{GtfsError, GtfsResult};

const PROGRESS_INTERVAL: usize = 10_000;

/// Per-table skip counts from a completed load, logged as a summary once
/// loading finishes.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub agencies: usize,
    pub routes: usize,
    pub services: usize,
    pub exceptions: usize,
    pub stops: usize,
    pub trips: usize,
    pub stop_times: usize,
    pub skipped: HashMap<&'static str, usize>,
}

impl LoadReport {
    fn skip(&mut self, table: &'static str) {
        *self.skipped.entry(table).or_insert(0) += 1;
    }
}

/// Reads the six static tables from `data_dir` (each `<name>.txt`, header
/// row present) and assembles a [`StaticData`] snapshot. When `filter_stops`
/// is set, trips and stop-time buckets not reachable from those stop
/// numbers are left out of the result.
pub fn load_static(data_dir: &Path, filter_stops: Option<&[String]>) -> GtfsResult<(StaticData, LoadReport)> {
    let mut report = LoadReport::default();

    let agencies = load_agencies(data_dir, &mut report)?;
    let routes = load_routes(data_dir, &mut report)?;
    validate_route_agencies(&routes, &agencies)?;
    let services = load_calendar(data_dir, &mut report)?;
    let exceptions = load_calendar_dates(data_dir, &mut report)?;
    let stops = load_stops(data_dir, &mut report)?;

    let stop_id_to_number: HashMap<String, String> = stops
        .values()
        .map(|stop| (stop.stop_id.clone(), stop.stop_number.clone()))
        .collect();

    let (mut stop_time_buckets, stop_trips) =
        load_stop_times(data_dir, &stop_id_to_number, &mut report)?;

    let trip_whitelist: Option<HashSet<String>> = filter_stops.map(|filter| {
        filter
            .iter()
            .flat_map(|stop_number| stop_trips.get(stop_number).cloned().unwrap_or_default())
            .collect()
    });

    if let Some(whitelist) = &trip_whitelist {
        for bucket in stop_time_buckets.values_mut() {
            bucket.retain(|packed| whitelist.contains(&packed.trip_id()));
        }
        stop_time_buckets.retain(|_, bucket| !bucket.is_empty());
    }

    let trips = load_trips(data_dir, trip_whitelist.as_ref(), &mut report)?;
    validate_trip_references(&trips, &routes, &services)?;

    // The stop-filter only scopes which trips/stop-times are materialized;
    // StopNumberSet always reflects every stop the feed knows about, filtered
    // or not, so a real stop outside the filter is "valid but unserved"
    // rather than "unknown".
    let stop_numbers: HashSet<String> = stops.values().map(|stop| stop.stop_number.clone()).collect();

    log::info!(
        "static load complete: {} agencies, {} routes, {} services, {} exceptions, {} stops, {} trips, {} stop_times (skipped: {:?})",
        report.agencies, report.routes, report.services, report.exceptions, report.stops, report.trips, report.stop_times, report.skipped,
    );

    Ok((
        StaticData {
            agencies,
            routes,
            services,
            exceptions,
            stops,
            stop_numbers,
            trips,
            stop_time_buckets,
        },
        report,
    ))
}

fn open_table(data_dir: &Path, name: &str) -> GtfsResult<csv::Reader<std::fs::File>> {
    let path = data_dir.join(name);
    if !path.exists() {
        return Err(GtfsError::StaticMissing(format!("{} not found in {}", name, data_dir.display())));
    }
    Ok(ReaderBuilder::new().has_headers(true).from_path(path)?)
}

fn load_agencies(data_dir: &Path, report: &mut LoadReport) -> GtfsResult<HashMap<String, Agency>> {
    let mut reader = open_table(data_dir, "agency.txt")?;
    let mut agencies = HashMap::new();
    for record in reader.deserialize::<AgencyRow>() {
        let Ok(row) = record else {
            report.skip("agency");
            continue;
        };
        agencies.insert(
            row.agency_id.clone(),
            Agency {
                agency_id: row.agency_id,
                agency_name: row.agency_name,
            },
        );
    }
    report.agencies = agencies.len();
    Ok(agencies)
}

fn load_routes(data_dir: &Path, report: &mut LoadReport) -> GtfsResult<HashMap<String, Route>> {
    let mut reader = open_table(data_dir, "routes.txt")?;
    let mut routes = HashMap::new();
    for record in reader.deserialize::<RouteRow>() {
        let Ok(row) = record else {
            report.skip("routes");
            continue;
        };
        routes.insert(
            row.route_id.clone(),
            Route {
                route_id: row.route_id,
                agency_id: row.agency_id,
                short_name: row.route_short_name,
            },
        );
    }
    report.routes = routes.len();
    Ok(routes)
}

/// Every `Route.agency_id` must resolve to a loaded `Agency`. Unlike a
/// malformed CSV row, a dangling reference here means the feed is
/// internally inconsistent and the whole load is aborted.
fn validate_route_agencies(routes: &HashMap<String, Route>, agencies: &HashMap<String, Agency>) -> GtfsResult<()> {
    for route in routes.values() {
        if !agencies.contains_key(&route.agency_id) {
            return Err(GtfsError::ReferentialIntegrity(format!(
                "route {} references unknown agency_id {}",
                route.route_id, route.agency_id
            )));
        }
    }
    Ok(())
}

/// Every `Trip.route_id` and `Trip.service_id` must resolve to a loaded
/// `Route`/`Service`.
fn validate_trip_references(
    trips: &HashMap<String, PackedTrip>,
    routes: &HashMap<String, Route>,
    services: &HashMap<String, Service>,
) -> GtfsResult<()> {
    for (trip_id, packed) in trips {
        let (route_id, service_id) = packed.unpack();
        if !routes.contains_key(&route_id) {
            return Err(GtfsError::ReferentialIntegrity(format!(
                "trip {trip_id} references unknown route_id {route_id}"
            )));
        }
        if !services.contains_key(&service_id) {
            return Err(GtfsError::ReferentialIntegrity(format!(
                "trip {trip_id} references unknown service_id {service_id}"
            )));
        }
    }
    Ok(())
}

fn load_calendar(data_dir: &Path, report: &mut LoadReport) -> GtfsResult<HashMap<String, Service>> {
    let mut reader = open_table(data_dir, "calendar.txt")?;
    let mut services = HashMap::new();
    for record in reader.deserialize::<CalendarRow>() {
        let Ok(row) = record else {
            report.skip("calendar");
            continue;
        };
        services.insert(
            row.service_id.clone(),
            Service {
                service_id: row.service_id.clone(),
                days: row.days(),
                start_date: row.start_date,
                end_date: row.end_date,
            },
        );
    }
    report.services = services.len();
    Ok(services)
}

fn load_calendar_dates(
    data_dir: &Path,
    report: &mut LoadReport,
) -> GtfsResult<HashMap<(String, chrono::NaiveDate), ExceptionType>> {
    let mut reader = open_table(data_dir, "calendar_dates.txt")?;
    let mut exceptions = HashMap::new();
    for record in reader.deserialize::<CalendarDateRow>() {
        let Ok(row) = record else {
            report.skip("calendar_dates");
            continue;
        };
        let Some(exception_type) = ExceptionType::from_gtfs_code(row.exception_type) else {
            report.skip("calendar_dates");
            continue;
        };
        exceptions.insert((row.service_id, row.date), exception_type);
    }
    report.exceptions = exceptions.len();
    Ok(exceptions)
}

fn load_stops(data_dir: &Path, report: &mut LoadReport) -> GtfsResult<HashMap<String, Stop>> {
    let mut reader = open_table(data_dir, "stops.txt")?;
    let mut stops = HashMap::new();
    for record in reader.deserialize::<StopRow>() {
        let Ok(row) = record else {
            report.skip("stops");
            continue;
        };
        stops.insert(
            row.stop_id.clone(),
            Stop {
                stop_id: row.stop_id.clone(),
                stop_number: row.stop_number(),
            },
        );
    }
    report.stops = stops.len();
    Ok(stops)
}

type StopTimeBuckets = HashMap<(String, u8), Vec<PackedStopTime>>;
type StopTrips = HashMap<String, HashSet<String>>;

fn load_stop_times(
    data_dir: &Path,
    stop_id_to_number: &HashMap<String, String>,
    report: &mut LoadReport,
) -> GtfsResult<(StopTimeBuckets, StopTrips)> {
    let mut reader = open_table(data_dir, "stop_times.txt")?;
    let mut buckets: StopTimeBuckets = HashMap::new();
    let mut stop_trips: StopTrips = HashMap::new();
    let mut count = 0usize;

    for record in reader.deserialize::<StopTimeRow>() {
        let Ok(row) = record else {
            report.skip("stop_times");
            continue;
        };
        let Some(stop_number) = stop_id_to_number.get(&row.stop_id) else {
            report.skip("stop_times");
            continue;
        };

        let hour_bucket = row.arrival_time.hours.rem_euclid(24) as u8;
        let packed = PackedStopTime::pack(
            &row.trip_id,
            row.arrival_time.hours as i8,
            row.arrival_time.minutes as i8,
            row.arrival_time.seconds as i8,
            row.stop_sequence,
        );
        buckets
            .entry((stop_number.clone(), hour_bucket))
            .or_default()
            .push(packed);
        stop_trips
            .entry(stop_number.clone())
            .or_default()
            .insert(row.trip_id);

        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            log::debug!("loaded {count} stop_times rows");
        }
    }
    report.stop_times = count;
    Ok((buckets, stop_trips))
}

fn load_trips(
    data_dir: &Path,
    trip_whitelist: Option<&HashSet<String>>,
    report: &mut LoadReport,
) -> GtfsResult<HashMap<String, PackedTrip>> {
    let mut reader = open_table(data_dir, "trips.txt")?;
    let mut trips = HashMap::new();
    for record in reader.deserialize::<TripRow>() {
        let Ok(row) = record else {
            report.skip("trips");
            continue;
        };
        if let Some(whitelist) = trip_whitelist {
            if !whitelist.contains(&row.trip_id) {
                continue;
            }
        }
        trips.insert(row.trip_id, PackedTrip::pack(&row.route_id, &row.service_id));
    }
    report.trips = trips.len();
    Ok(trips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn write_minimal_feed(dir: &Path) {
        write_fixture(dir, "agency.txt", "agency_id,agency_name\n91,Dublin Bus\n");
        write_fixture(
            dir,
            "routes.txt",
            "route_id,agency_id,route_short_name\nr49,91,49\n",
        );
        write_fixture(
            dir,
            "calendar.txt",
            "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n180,0,0,0,0,1,0,0,20230101,20231231\n",
        );
        write_fixture(
            dir,
            "calendar_dates.txt",
            "service_id,date,exception_type\n",
        );
        write_fixture(dir, "stops.txt", "stop_id,stop_code\ns1358,1358\ns9999,\n");
        write_fixture(
            dir,
            "trips.txt",
            "route_id,service_id,trip_id\nr49,180,t1\n",
        );
        write_fixture(
            dir,
            "stop_times.txt",
            "trip_id,stop_id,arrival_time,stop_sequence\nt1,s1358,09:15:50,1\n",
        );
    }

    #[test]
    fn loads_a_minimal_feed() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_feed(dir.path());

        let (data, report) = load_static(dir.path(), None).unwrap();
        assert_eq!(report.agencies, 1);
        assert_eq!(report.trips, 1);
        assert_eq!(report.stop_times, 1);
        assert!(data.is_valid_stop_number("1358"));
        // blank stop_code falls back to stop_id.
        assert!(data.stop_numbers.contains("s9999"));
        assert!(data.stop_time_buckets.contains_key(&("1358".to_owned(), 9)));
    }

    #[test]
    fn filter_stops_excludes_unreachable_trips() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_feed(dir.path());
        write_fixture(
            dir.path(),
            "trips.txt",
            "route_id,service_id,trip_id\nr49,180,t1\nr49,180,t2\n",
        );

        let filter = vec!["1358".to_owned()];
        let (data, _) = load_static(dir.path(), Some(&filter)).unwrap();
        assert!(data.trips.contains_key("t1"));
        assert!(!data.trips.contains_key("t2"));
    }

    #[test]
    fn filter_stops_does_not_narrow_the_stop_number_set() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_feed(dir.path());

        // "1358" is the only stop in the filter, but "s9999" is still a real,
        // known stop and must stay valid — just unserved.
        let filter = vec!["1358".to_owned()];
        let (data, _) = load_static(dir.path(), Some(&filter)).unwrap();
        assert!(data.is_valid_stop_number("1358"));
        assert!(data.stop_numbers.contains("s9999"));
    }

    #[test]
    fn a_route_referencing_an_unknown_agency_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_feed(dir.path());
        write_fixture(
            dir.path(),
            "routes.txt",
            "route_id,agency_id,route_short_name\nr49,nonexistent,49\n",
        );

        let err = load_static(dir.path(), None).unwrap_err();
        assert!(matches!(err, GtfsError::ReferentialIntegrity(_)));
    }

    #[test]
    fn a_trip_referencing_an_unknown_service_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_feed(dir.path());
        write_fixture(
            dir.path(),
            "trips.txt",
            "route_id,service_id,trip_id\nr49,nonexistent,t1\n",
        );

        let err = load_static(dir.path(), None).unwrap_err();
        assert!(matches!(err, GtfsError::ReferentialIntegrity(_)));
    }
}
