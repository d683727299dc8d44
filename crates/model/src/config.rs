//! Environment-driven configuration, assembled once at startup.
//!
//! Unlike a connection-info struct that simply fails to build when a
//! variable is missing, every field here has a documented default: a
//! malformed or absent value is logged and replaced rather than treated as
//! fatal (see `ConfigInvalid` in the resolver/store error types).

use std::env;

const DEFAULT_STATIC_URL: &str =
    "https://www.transportforireland.ie/transitData/Data/GTFS_Realtime.zip";
const DEFAULT_LIVE_URL: &str = "https://api.nationaltransport.ie/gtfsr/v2/TripUpdates";
const DEFAULT_POLLING_PERIOD_SECONDS: u64 = 60;
const DEFAULT_MAX_MINUTES: i64 = 60;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BIND_ADDR: &str = "localhost:7341";
const DEFAULT_LOG_LEVEL: &str = "INFO";

const VALID_LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

#[derive(Debug, Clone)]
pub struct Config {
    pub static_url: String,
    pub live_url: String,
    pub api_key: Option<String>,
    pub cache_backend_url: Option<String>,
    pub polling_period_seconds: u64,
    pub max_minutes: i64,
    pub filter_stops: Option<Vec<String>>,
    pub data_dir: String,
    pub bind_addr: String,
    pub log_level: String,
}

impl Config {
    /// Reads every field from its environment variable, falling back to the
    /// documented default when the variable is absent or fails to parse.
    pub fn from_env() -> Self {
        Self {
            static_url: env::var("GTFS_STATIC_URL").unwrap_or_else(|_| DEFAULT_STATIC_URL.to_owned()),
            live_url: env::var("GTFS_LIVE_URL").unwrap_or_else(|_| DEFAULT_LIVE_URL.to_owned()),
            api_key: env::var("API_KEY").ok(),
            cache_backend_url: env::var("REDIS_URL").ok(),
            polling_period_seconds: env_parsed_or("POLLING_PERIOD", DEFAULT_POLLING_PERIOD_SECONDS),
            max_minutes: env_parsed_or("MAX_MINUTES", DEFAULT_MAX_MINUTES),
            filter_stops: env::var("FILTER_STOPS").ok().map(|raw| {
                raw.split(',')
                    .map(|stop| stop.trim().to_owned())
                    .filter(|stop| !stop.is_empty())
                    .collect()
            }),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_owned()),
            bind_addr: bind_addr_from_env(),
            log_level: log_level_from_env(),
        }
    }
}

fn env_parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn bind_addr_from_env() -> String {
    if let Ok(addr) = env::var("BIND_ADDR") {
        return addr;
    }
    let host = env::var("HOST").unwrap_or_else(|_| "localhost".to_owned());
    let port = env::var("PORT").unwrap_or_else(|_| "7341".to_owned());
    if port.parse::<u16>().is_ok() {
        format!("{host}:{port}")
    } else {
        log::warn!("Invalid PORT value {port:?}, defaulting to {DEFAULT_BIND_ADDR}");
        DEFAULT_BIND_ADDR.to_owned()
    }
}

fn log_level_from_env() -> String {
    let raw = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_owned());
    let upper = raw.to_uppercase();
    if VALID_LOG_LEVELS.contains(&upper.as_str()) {
        upper
    } else {
        eprintln!("Invalid log level: {raw}. Defaulting to '{DEFAULT_LOG_LEVEL}'.");
        DEFAULT_LOG_LEVEL.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_filter_stops() {
        std::env::set_var("FILTER_STOPS", " 1358, 1359 ,1360");
        let config = Config::from_env();
        assert_eq!(
            config.filter_stops,
            Some(vec!["1358".to_owned(), "1359".to_owned(), "1360".to_owned()])
        );
        std::env::remove_var("FILTER_STOPS");
    }

    #[test]
    fn falls_back_to_default_log_level_when_invalid() {
        std::env::set_var("LOG_LEVEL", "NOT_A_LEVEL");
        let config = Config::from_env();
        assert_eq!(config.log_level, "INFO");
        std::env::remove_var("LOG_LEVEL");
    }
}
