//! Periodic fetch + parse of the GTFS-realtime feed, dispatching updates
//! into the live namespaces the resolver reads from.

use chrono::{DateTime, NaiveDateTime};
use model::arrival::{LiveAddition, LiveDelayEntry};
use prost::Message;
use reqwest::StatusCode;
use store::live::LiveData;
use store::static_data::StaticData;

use crate::data_model::realtime::trip_descriptor::ScheduleRelationship as TripScheduleRelationship;
use crate::data_model::realtime::trip_update::stop_time_update::ScheduleRelationship as StopScheduleRelationship;
use crate::data_model::realtime::FeedMessage;

/// Upstream live updates reporting a delay more negative than a week are
/// known garbage from the feed provider.
const GARBAGE_DELAY_THRESHOLD_SECONDS: i32 = -604_800;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    pub updates: usize,
    pub unrecognised: usize,
    pub added: usize,
    pub cancelled: usize,
}

/// The result of one poll attempt. A caller drives backoff off this: a
/// successful pass (even with zero updates) resets it, `RateLimited`
/// extends it, everything else leaves it untouched.
#[derive(Debug)]
pub enum PollOutcome {
    Applied(IngestStats),
    RateLimited,
    AuthFailed,
    Transient(String),
    Corrupt,
}

pub async fn poll_once(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    filter_stops: Option<&[String]>,
    static_data: &StaticData,
    live: &LiveData,
) -> PollOutcome {
    let mut request = client.get(url).header("Cache-Control", "no-cache");
    if let Some(api_key) = api_key {
        request = request.header("x-api-key", api_key);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(why) => return PollOutcome::Transient(why.to_string()),
    };

    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => return PollOutcome::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return PollOutcome::AuthFailed,
        status if !status.is_success() => {
            return PollOutcome::Transient(format!("upstream returned {status}"))
        }
        _ => {}
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(why) => return PollOutcome::Transient(why.to_string()),
    };

    let feed = match FeedMessage::decode(body) {
        Ok(feed) => feed,
        Err(why) => {
            log::warn!("discarding corrupt realtime feed: {why}");
            return PollOutcome::Corrupt;
        }
    };

    PollOutcome::Applied(apply_feed(feed, filter_stops, static_data, live))
}

fn apply_feed(
    feed: FeedMessage,
    filter_stops: Option<&[String]>,
    static_data: &StaticData,
    live: &LiveData,
) -> IngestStats {
    let observed_at = feed.header.timestamp.unwrap_or(0) as i64;
    let mut stats = IngestStats::default();

    for entity in feed.entity {
        let Some(trip_update) = entity.trip_update else {
            continue;
        };
        let trip = trip_update.trip;
        let Some(trip_id) = trip.trip_id.clone() else {
            continue;
        };

        let relationship = trip.schedule_relationship();
        if relationship == TripScheduleRelationship::Canceled {
            live.cancel(&trip_id);
            stats.cancelled += 1;
            continue;
        }

        let mut trip_delays = Vec::new();

        for stop_time_update in trip_update.stop_time_update {
            if stop_time_update.schedule_relationship() != StopScheduleRelationship::Scheduled {
                continue;
            }

            let resolved_stop_number = stop_time_update
                .stop_id
                .as_deref()
                .and_then(|stop_id| resolve_stop_number(static_data, stop_id));

            let Some(stop_number) = resolved_stop_number else {
                if filter_stops.is_none() {
                    log::warn!("realtime update referenced an unknown stop_id, skipping");
                }
                continue;
            };

            if let Some(filter) = filter_stops {
                if !filter.contains(&stop_number) {
                    continue;
                }
            }

            match relationship {
                TripScheduleRelationship::Added => {
                    let Some(arrival_time) = stop_time_update
                        .arrival
                        .as_ref()
                        .and_then(|arrival| arrival.time)
                        .and_then(from_unix)
                    else {
                        continue;
                    };
                    live.push_addition(
                        &stop_number,
                        LiveAddition {
                            route_id: trip.route_id.clone().unwrap_or_default(),
                            arrival_time,
                            observed_at,
                        },
                    );
                    stats.added += 1;
                }
                TripScheduleRelationship::Scheduled | TripScheduleRelationship::Unscheduled => {
                    if !static_data.trips.contains_key(&trip_id) {
                        stats.unrecognised += 1;
                        continue;
                    }
                    let stop_sequence = stop_time_update.stop_sequence.unwrap_or(0) as i8;
                    let delay = stop_time_update.arrival.as_ref().and_then(|arrival| {
                        if arrival.time.is_some() {
                            None
                        } else {
                            arrival.delay
                        }
                    });
                    if matches!(delay, Some(delay) if delay < GARBAGE_DELAY_THRESHOLD_SECONDS) {
                        continue;
                    }
                    trip_delays.push(LiveDelayEntry {
                        stop_sequence,
                        delay,
                        observed_at,
                    });
                    stats.updates += 1;
                }
                TripScheduleRelationship::Canceled => unreachable!("handled above"),
            }
        }

        if !trip_delays.is_empty() {
            trip_delays.sort_by_key(|entry| entry.stop_sequence);
            live.set_delays(&trip_id, trip_delays);
        }
    }

    stats
}

fn resolve_stop_number(static_data: &StaticData, stop_id: &str) -> Option<String> {
    static_data
        .stops
        .get(stop_id)
        .map(|stop| stop.stop_number.clone())
}

fn from_unix(timestamp: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.naive_local())
}

/// `polling_period * 1.5^rate_limit_count`, applied on top of the regular
/// cadence when the upstream feed starts returning `429`.
pub fn backoff_seconds(polling_period_seconds: u64, rate_limit_count: u32) -> f64 {
    polling_period_seconds as f64 * 1.5f64.powi(rate_limit_count as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_with_rate_limit_count() {
        assert_eq!(backoff_seconds(60, 0), 60.0);
        assert_eq!(backoff_seconds(60, 1), 90.0);
        assert_eq!(backoff_seconds(60, 2), 135.0);
    }

    #[test]
    fn ingest_stats_default_to_zero() {
        let stats = IngestStats::default();
        assert_eq!(stats, IngestStats { updates: 0, unrecognised: 0, added: 0, cancelled: 0 });
    }
}
