pub mod data_model;
pub mod download;
pub mod error;
pub mod live_ingestor;
pub mod static_loader;

pub use error::{GtfsError, GtfsResult};
pub use live_ingestor::{poll_once, IngestStats, PollOutcome};
pub use static_loader::{load_static, LoadReport};
