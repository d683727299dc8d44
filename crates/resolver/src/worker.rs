//! The daemon-style live-refresh loop: polls the realtime feed on a
//! cadence, backing off exponentially while the upstream rate-limits us.
//!
//! Shaped after the teacher's own collector loop (spawn once, tick
//! forever, `catch_unwind` around the body so one bad poll can't take the
//! whole worker down) but stripped of the generic `Collector` trait
//! machinery — there is exactly one thing this loop ever does.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use gtfs::PollOutcome;
use store::live::LiveData;
use store::static_data::StaticDataHandle;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub live_url: String,
    pub api_key: Option<String>,
    pub filter_stops: Option<Vec<String>>,
    pub polling_period_seconds: u64,
}

/// Runs until the process exits. Each iteration polls once, logs a summary,
/// and sleeps for the configured period — extended by
/// `polling_period * 1.5^rate_limit_count` for as long as the upstream
/// keeps returning `429`.
pub async fn run_live_worker(config: WorkerConfig, static_data: Arc<StaticDataHandle>, live: Arc<LiveData>) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("building the realtime HTTP client");

    let mut rate_limit_count: u32 = 0;

    loop {
        let snapshot = static_data.load();
        let outcome = AssertUnwindSafe(gtfs::poll_once(
            &client,
            &config.live_url,
            config.api_key.as_deref(),
            config.filter_stops.as_deref(),
            &snapshot,
            &live,
        ))
        .catch_unwind()
        .await;

        match outcome {
            Ok(PollOutcome::Applied(stats)) => {
                rate_limit_count = 0;
                log::info!(
                    "live ingest: {} updates, {} unrecognised, {} added, {} cancelled",
                    stats.updates, stats.unrecognised, stats.added, stats.cancelled,
                );
            }
            Ok(PollOutcome::RateLimited) => {
                rate_limit_count += 1;
                log::warn!("live feed rate-limited us (count={rate_limit_count}), backing off");
            }
            Ok(PollOutcome::AuthFailed) => {
                log::error!("live feed rejected our API key, retaining prior live data");
            }
            Ok(PollOutcome::Transient(why)) => {
                log::warn!("live feed fetch failed: {why}");
            }
            Ok(PollOutcome::Corrupt) => {
                log::warn!("discarded a corrupt live feed payload");
            }
            Err(panic) => {
                log::error!("live ingest panicked: {panic:?}");
            }
        }

        let delay = gtfs::live_ingestor::backoff_seconds(config.polling_period_seconds, rate_limit_count);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    }
}
