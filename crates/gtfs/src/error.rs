use std::fmt;

/// Load-time and fetch-time failures. Malformed individual rows during
/// static load and bad individual updates during live ingest are not
/// represented here — they are counted and logged, never propagated, so a
/// single bad row or a single bad upstream push cannot abort an
/// otherwise-good pass. A dangling foreign key between static tables is
/// not a per-row problem and is propagated via `ReferentialIntegrity`.
#[derive(Debug)]
pub enum GtfsError {
    /// No static data directory, or a required file is missing from it.
    StaticMissing(String),
    /// A static table referenced a key absent from a table it depends on
    /// (route -> agency, trip -> route/service).
    ReferentialIntegrity(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Http(reqwest::Error),
    Zip(zip::result::ZipError),
}

impl fmt::Display for GtfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticMissing(why) => write!(f, "static data missing: {why}"),
            Self::ReferentialIntegrity(why) => write!(f, "referential integrity violation: {why}"),
            Self::Io(why) => write!(f, "io error: {why}"),
            Self::Csv(why) => write!(f, "csv error: {why}"),
            Self::Http(why) => write!(f, "http error: {why}"),
            Self::Zip(why) => write!(f, "zip error: {why}"),
        }
    }
}

impl std::error::Error for GtfsError {}

impl From<std::io::Error> for GtfsError {
    fn from(why: std::io::Error) -> Self {
        Self::Io(why)
    }
}

impl From<csv::Error> for GtfsError {
    fn from(why: csv::Error) -> Self {
        Self::Csv(why)
    }
}

impl From<reqwest::Error> for GtfsError {
    fn from(why: reqwest::Error) -> Self {
        Self::Http(why)
    }
}

impl From<zip::result::ZipError> for GtfsError {
    fn from(why: zip::result::ZipError) -> Self {
        Self::Zip(why)
    }
}

pub type GtfsResult<T> = Result<T, GtfsError>;
