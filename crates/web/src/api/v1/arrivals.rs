//! `GET /api/v1/arrivals?stop=<n>&stop=<n>...` — the one query contract
//! this service exists to serve.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Query;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::WebState;

#[derive(Debug, Deserialize)]
pub struct ArrivalsQuery {
    #[serde(default)]
    stop: Vec<String>,
    max_wait: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StopResult {
    Arrivals(Vec<model::arrival::Arrival>),
    Unknown(&'static str),
}

pub async fn get_arrivals(
    State(state): State<WebState>,
    Query(query): Query<ArrivalsQuery>,
) -> (StatusCode, Json<HashMap<String, StopResult>>) {
    let static_data = state.static_data.load();
    let max_wait = Duration::minutes(query.max_wait.unwrap_or(state.config.max_minutes));
    let now = chrono::Local::now().naive_local();

    let mut response = HashMap::with_capacity(query.stop.len());
    let mut any_known = false;
    for stop_number in query.stop {
        if !resolver::is_valid_stop_number(&static_data, &stop_number).await {
            response.insert(stop_number, StopResult::Unknown("unknown stop"));
            continue;
        }
        any_known = true;
        let arrivals =
            resolver::get_scheduled_arrivals(&static_data, &state.live, &stop_number, now, max_wait).await;
        response.insert(stop_number, StopResult::Arrivals(arrivals));
    }

    // A request naming only unknown stops gets a 404-with-body instead of
    // a silent empty 200; one valid stop among several is enough to keep
    // the whole response at 200.
    let status = if !response.is_empty() && !any_known { StatusCode::NOT_FOUND } else { StatusCode::OK };
    (status, Json(response))
}
