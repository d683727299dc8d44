use serde::Deserialize;

/// One row of `agency.txt`.
/// See <https://gtfs.org/schedule/reference/#agencytxt>
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyRow {
    pub agency_id: String,
    pub agency_name: String,
}
