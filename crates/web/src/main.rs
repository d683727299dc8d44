use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use model::config::Config;
use resolver::{run_live_worker, WorkerConfig};
use store::{load_static_snapshot, write_static_snapshot, LiveData, StaticDataHandle};
use web::{start_web_server, WebState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Arc::new(Config::from_env());
    let data_dir = Path::new(&config.data_dir);
    let snapshot_path = data_dir.join("store.snapshot");

    let static_data = load_or_fetch_static(&config, data_dir, &snapshot_path).await;
    let static_data = Arc::new(StaticDataHandle::new(static_data));
    let live = Arc::new(LiveData::new());
    let ready = Arc::new(AtomicBool::new(true));

    tokio::spawn(run_live_worker(
        WorkerConfig {
            live_url: config.live_url.clone(),
            api_key: config.api_key.clone(),
            filter_stops: config.filter_stops.clone(),
            polling_period_seconds: config.polling_period_seconds,
        },
        static_data.clone(),
        live.clone(),
    ));

    let state = WebState { static_data, live, config, ready };
    start_web_server(state).await.expect("web server failed");
}

/// Loads the static snapshot written by a previous run when no external
/// cache backend is configured; otherwise downloads and parses a fresh
/// feed (and, the first time, writes the snapshot back out).
async fn load_or_fetch_static(
    config: &Config,
    data_dir: &Path,
    snapshot_path: &Path,
) -> store::StaticData {
    if config.cache_backend_url.is_none() {
        match load_static_snapshot(snapshot_path) {
            Ok(Some(data)) => {
                log::info!("loaded static data from snapshot at {}", snapshot_path.display());
                return data;
            }
            Ok(None) => {}
            Err(why) => log::warn!("ignoring corrupt snapshot at {}: {why}", snapshot_path.display()),
        }
    }

    if !data_dir.join("agency.txt").exists() {
        let client = reqwest::Client::new();
        gtfs::download::download_and_extract(&client, &config.static_url, data_dir)
            .await
            .expect("static feed unavailable and no local copy present");
    }

    let (data, report) = gtfs::load_static(data_dir, config.filter_stops.as_deref())
        .expect("static data missing or unreadable");
    log::info!("static load report: {report:?}");

    if let Err(why) = write_static_snapshot(&data, snapshot_path) {
        log::warn!("could not write static snapshot: {why}");
    }

    data
}
