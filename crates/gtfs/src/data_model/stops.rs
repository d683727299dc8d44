use serde::Deserialize;

/// One row of `stops.txt`. `stop_code` is the code printed on the physical
/// stop pole; when a feed leaves it blank the loader falls back to
/// `stop_id` so every stop still has a rider-facing number.
/// See <https://gtfs.org/schedule/reference/#stopstxt>
#[derive(Debug, Clone, Deserialize)]
pub struct StopRow {
    pub stop_id: String,
    #[serde(default)]
    pub stop_code: Option<String>,
}

impl StopRow {
    pub fn stop_number(&self) -> String {
        match &self.stop_code {
            Some(code) if !code.trim().is_empty() => code.clone(),
            _ => self.stop_id.clone(),
        }
    }
}
