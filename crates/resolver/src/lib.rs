//! The Arrival Resolver: joins a stop number against the static timetable
//! and the live feed to answer "what's coming, and when".
//!
//! Every public lookup here is `async fn` purely so callers can treat this
//! crate the same way they'd treat one backed by an external store —
//! nothing in this module actually suspends. All of it runs against
//! in-process data (`ArcSwap`/`DashMap`), so there is no I/O to wait on.

pub mod error;
pub mod worker;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use model::arrival::Arrival;
use model::entities::{ExceptionType, TripInfo};
use store::live::LiveData;
use store::static_data::StaticData;

pub use error::{ResolverError, ResolverResult};
pub use worker::{run_live_worker, WorkerConfig};

/// Looks up the joined `{route, agency, service}` view for a trip by
/// following `Trip -> Route -> Agency` and `Trip -> Service`. Missing links
/// anywhere in the chain resolve to `None`, never an error.
pub async fn get_trip_info(static_data: &StaticData, trip_id: &str) -> Option<TripInfo> {
    let packed = static_data.trips.get(trip_id)?;
    let (route_id, service_id) = packed.unpack();

    let route = static_data.routes.get(&route_id)?;
    let agency = static_data.agencies.get(&route.agency_id)?;
    let service = static_data.services.get(&service_id)?;

    Some(TripInfo {
        route_short_name: route.short_name.clone(),
        agency_name: agency.agency_name.clone(),
        service_id: service.service_id.clone(),
        start_date: service.start_date,
        end_date: service.end_date,
        days: service.days,
    })
}

/// Whether `stop_number` is a rider-facing code the static feed knows about.
pub async fn is_valid_stop_number(static_data: &StaticData, stop_number: &str) -> bool {
    static_data.is_valid_stop_number(stop_number)
}

/// Propagates the most recent upstream delay for `trip_id` forward to
/// `stop_sequence`: an exact match returns its own delay, otherwise the
/// delay of the nearest prior stop that has been updated. Returns `None`
/// when the trip has no live observations at all, or none at or before
/// this stop.
pub async fn get_live_delay(live: &LiveData, trip_id: &str, stop_sequence: i8) -> Option<i32> {
    let updates = live.delays_for_trip(trip_id)?;
    if updates.is_empty() {
        return None;
    }

    let mut left: isize = 0;
    let mut right: isize = updates.len() as isize - 1;
    while left <= right {
        let mid = (left + right) / 2;
        match updates[mid as usize].stop_sequence.cmp(&stop_sequence) {
            std::cmp::Ordering::Less => left = mid + 1,
            std::cmp::Ordering::Greater => right = mid - 1,
            std::cmp::Ordering::Equal => return updates[mid as usize].delay,
        }
    }

    if left == 0 {
        None
    } else {
        updates[left as usize - 1].delay
    }
}

/// The hours (mod 24) worth searching for a query landing at `now` with a
/// window of `max_wait`: the hour before `now` (to catch timetable entries
/// just shy of the clock) through `now.hour() + floor(max_wait / 1h)`.
fn try_hours(now: NaiveDateTime, max_wait: Duration) -> Vec<u32> {
    let hour_before = if now.hour() == 0 { 23 } else { now.hour() - 1 };
    let extra_hours = (max_wait.num_seconds() / 3600).max(0) as u32;

    let mut hours = vec![hour_before];
    hours.extend((now.hour()..=now.hour() + extra_hours).map(|h| h % 24));
    hours
}

/// `now`'s distance from the midnight that starts its calendar day.
fn time_since_midnight(now: NaiveDateTime) -> Duration {
    now.time() - chrono::NaiveTime::MIN
}

/// All arrivals expected at `stop_number` between `now` and `now + max_wait`,
/// combining the timetable, calendar exceptions, live delays and live
/// unscheduled additions, sorted ascending by the rider-relevant time.
pub async fn get_scheduled_arrivals(
    static_data: &StaticData,
    live: &LiveData,
    stop_number: &str,
    now: NaiveDateTime,
    max_wait: Duration,
) -> Vec<Arrival> {
    let mut arrivals = Vec::new();
    let midnight = now.date().and_time(chrono::NaiveTime::MIN);
    let since_midnight = time_since_midnight(now);

    for hour in try_hours(now, max_wait) {
        let Some(bucket) = static_data
            .stop_time_buckets
            .get(&(stop_number.to_owned(), hour as u8))
        else {
            continue;
        };

        for packed in bucket {
            let trip_id = packed.trip_id();
            let mut arrival_offset =
                Duration::hours(packed.arrival_h as i64) + Duration::minutes(packed.arrival_m as i64) + Duration::seconds(packed.arrival_s as i64);

            if since_midnight - Duration::hours(12) > arrival_offset {
                arrival_offset += Duration::hours(24);
            }
            let arrival_datetime = midnight + arrival_offset;

            let Some(trip_info) = get_trip_info(static_data, &trip_id).await else {
                continue;
            };

            let date = arrival_datetime.date();
            let service_is_scheduled = date >= trip_info.start_date
                && date <= trip_info.end_date
                && trip_info.days[date.weekday().num_days_from_monday() as usize];
            let exception = static_data.exceptions.get(&(trip_info.service_id.clone(), date));
            let added = exception == Some(&ExceptionType::Added);
            let removed = exception == Some(&ExceptionType::Removed);

            if !(added || (service_is_scheduled && !removed)) {
                continue;
            }
            if live.is_cancelled(&trip_id) {
                continue;
            }

            let delay = get_live_delay(live, &trip_id, packed.stop_sequence).await;
            let real_time_arrival = delay.map(|delay| arrival_datetime + Duration::seconds(delay as i64));

            if !(arrival_datetime > now || matches!(real_time_arrival, Some(rt) if rt > now)) {
                continue;
            }

            arrivals.push(Arrival {
                route: trip_info.route_short_name,
                agency: trip_info.agency_name,
                scheduled_arrival: arrival_datetime,
                real_time_arrival,
            });
        }
    }

    for addition in live.additions_for_stop(stop_number) {
        let Some(route) = static_data.routes.get(&addition.route_id) else {
            continue;
        };
        let Some(agency) = static_data.agencies.get(&route.agency_id) else {
            continue;
        };
        arrivals.push(Arrival {
            route: route.short_name.clone(),
            agency: agency.agency_name.clone(),
            scheduled_arrival: addition.arrival_time,
            real_time_arrival: Some(addition.arrival_time),
        });
    }

    arrivals.sort_by_key(Arrival::effective_arrival);
    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::entities::{Agency, Route, Service, Stop};
    use model::packed::{PackedStopTime, PackedTrip};
    use std::collections::{HashMap, HashSet};

    fn dt(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 9, 15)
            .unwrap() // a Friday
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn minimal_static() -> StaticData {
        let mut agencies = HashMap::new();
        agencies.insert(
            "91".to_owned(),
            Agency { agency_id: "91".to_owned(), agency_name: "Dublin Bus".to_owned() },
        );
        let mut routes = HashMap::new();
        routes.insert(
            "r49".to_owned(),
            Route { route_id: "r49".to_owned(), agency_id: "91".to_owned(), short_name: "49".to_owned() },
        );
        let mut services = HashMap::new();
        services.insert(
            "180".to_owned(),
            Service {
                service_id: "180".to_owned(),
                days: [false, false, false, false, true, false, false], // Friday
                start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            },
        );
        let mut trips = HashMap::new();
        trips.insert("t1".to_owned(), PackedTrip::pack("r49", "180"));

        let mut stops = HashMap::new();
        stops.insert("s1358".to_owned(), Stop { stop_id: "s1358".to_owned(), stop_number: "1358".to_owned() });
        let mut stop_numbers = HashSet::new();
        stop_numbers.insert("1358".to_owned());

        let mut stop_time_buckets = HashMap::new();
        stop_time_buckets.insert(
            ("1358".to_owned(), 9),
            vec![PackedStopTime::pack("t1", 9, 20, 0, 4)],
        );

        StaticData {
            agencies,
            routes,
            services,
            exceptions: HashMap::new(),
            stops,
            stop_numbers,
            trips,
            stop_time_buckets,
        }
    }

    #[tokio::test]
    async fn resolves_a_scheduled_arrival_with_no_live_data() {
        let static_data = minimal_static();
        let live = LiveData::new();

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 0, 0), Duration::minutes(60)).await;
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].route, "49");
        assert!(arrivals[0].real_time_arrival.is_none());
    }

    #[tokio::test]
    async fn applies_a_live_delay_via_binary_search() {
        let static_data = minimal_static();
        let live = LiveData::new();
        live.set_delays(
            "t1",
            vec![model::arrival::LiveDelayEntry { stop_sequence: 4, delay: Some(120), observed_at: 0 }],
        );

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 0, 0), Duration::minutes(60)).await;
        assert_eq!(arrivals[0].real_time_arrival, Some(dt(9, 22, 0)));
    }

    #[tokio::test]
    async fn propagates_the_delay_of_the_nearest_earlier_sequence() {
        let live = LiveData::new();
        live.set_delays(
            "t1",
            vec![
                model::arrival::LiveDelayEntry { stop_sequence: 1, delay: Some(30), observed_at: 0 },
                model::arrival::LiveDelayEntry { stop_sequence: 3, delay: Some(90), observed_at: 0 },
            ],
        );
        assert_eq!(get_live_delay(&live, "t1", 2).await, Some(30));
        assert_eq!(get_live_delay(&live, "t1", 3).await, Some(90));
        assert_eq!(get_live_delay(&live, "t1", 5).await, Some(90));
        assert_eq!(get_live_delay(&live, "t1", 0).await, None);
        assert_eq!(get_live_delay(&live, "missing", 0).await, None);
    }

    #[tokio::test]
    async fn a_cancelled_trip_is_dropped_even_with_live_delay_data() {
        let static_data = minimal_static();
        let live = LiveData::new();
        live.cancel("t1");

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 0, 0), Duration::minutes(60)).await;
        assert!(arrivals.is_empty());
    }

    #[tokio::test]
    async fn a_calendar_exception_can_remove_an_otherwise_scheduled_trip() {
        let mut static_data = minimal_static();
        static_data.exceptions.insert(
            ("180".to_owned(), NaiveDate::from_ymd_opt(2023, 9, 15).unwrap()),
            ExceptionType::Removed,
        );
        let live = LiveData::new();

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 0, 0), Duration::minutes(60)).await;
        assert!(arrivals.is_empty());
    }

    #[tokio::test]
    async fn a_calendar_exception_can_add_a_trip_outside_its_weekly_pattern() {
        let mut static_data = minimal_static();
        // Sunday: day flag is off, so only the exception can make it run.
        static_data.stop_time_buckets.get_mut(&("1358".to_owned(), 9)).unwrap()[0] =
            PackedStopTime::pack("t1", 9, 20, 0, 4);
        static_data.services.get_mut("180").unwrap().days = [false; 7];
        static_data.exceptions.insert(
            ("180".to_owned(), NaiveDate::from_ymd_opt(2023, 9, 15).unwrap()),
            ExceptionType::Added,
        );
        let live = LiveData::new();

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 0, 0), Duration::minutes(60)).await;
        assert_eq!(arrivals.len(), 1);
    }

    #[tokio::test]
    async fn already_passed_arrivals_are_filtered_out() {
        let static_data = minimal_static();
        let live = LiveData::new();

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 30, 0), Duration::minutes(60)).await;
        assert!(arrivals.is_empty());
    }

    #[tokio::test]
    async fn a_late_real_time_arrival_keeps_a_stop_in_the_list_after_its_scheduled_time_passed() {
        let static_data = minimal_static();
        let live = LiveData::new();
        live.set_delays(
            "t1",
            vec![model::arrival::LiveDelayEntry { stop_sequence: 4, delay: Some(600), observed_at: 0 }],
        );

        // scheduled_arrival (09:20) has already passed, but the delayed
        // real_time_arrival (09:30) has not.
        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 25, 0), Duration::minutes(60)).await;
        assert_eq!(arrivals.len(), 1);
    }

    #[tokio::test]
    async fn day_rollover_treats_an_hour_zero_bucket_hit_as_tomorrow() {
        let mut static_data = minimal_static();
        // Querying late at night with a window that spills past midnight
        // pulls in the hour-0 bucket; a 00:10 entry found that way belongs
        // to tomorrow, not "ten minutes ago this morning".
        static_data.stop_time_buckets.clear();
        static_data.stop_time_buckets.insert(
            ("1358".to_owned(), 0),
            vec![PackedStopTime::pack("t1", 0, 10, 0, 4)],
        );
        static_data.services.get_mut("180").unwrap().days = [true; 7];
        let live = LiveData::new();

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(23, 50, 0), Duration::minutes(60)).await;
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].scheduled_arrival, dt(23, 50, 0).date().succ_opt().unwrap().and_hms_opt(0, 10, 0).unwrap());
    }

    #[tokio::test]
    async fn an_unscheduled_addition_appears_even_without_a_matching_trip() {
        let static_data = minimal_static();
        let live = LiveData::new();
        live.push_addition(
            "1358",
            model::arrival::LiveAddition {
                route_id: "r49".to_owned(),
                arrival_time: dt(9, 40, 0),
                observed_at: 0,
            },
        );

        let arrivals = get_scheduled_arrivals(&static_data, &live, "1358", dt(9, 0, 0), Duration::minutes(60)).await;
        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0].scheduled_arrival, dt(9, 20, 0));
        assert_eq!(arrivals[1].scheduled_arrival, dt(9, 40, 0));
    }

    #[tokio::test]
    async fn is_valid_stop_number_reflects_the_static_whitelist() {
        let static_data = minimal_static();
        assert!(is_valid_stop_number(&static_data, "1358").await);
        assert!(!is_valid_stop_number(&static_data, "9999").await);
    }
}
