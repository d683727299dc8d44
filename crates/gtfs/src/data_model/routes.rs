use serde::Deserialize;

/// One row of `routes.txt`.
/// See <https://gtfs.org/schedule/reference/#routestxt>
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRow {
    pub route_id: String,
    pub agency_id: String,
    pub route_short_name: String,
}
