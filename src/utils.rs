use crate::constants::{
    API_BASE_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_PORT, DEFAULT_WATCHLIST_PATH, PORT_ENV,
    TODAY_DATE_FORMAT, WATCHLIST_PATH_ENV,
};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Get server port from environment variable or use default
pub fn get_port() -> u16 {
    std::env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get durable watchlist path from environment variable or use default
pub fn get_watchlist_path() -> PathBuf {
    std::env::var(WATCHLIST_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_WATCHLIST_PATH))
}

/// Get the aggregation server base URL used by the client requester
pub fn get_api_base_url() -> String {
    std::env::var(API_BASE_URL_ENV)
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

/// Format a date as `YYYY-M-D`, the history feed's own format
pub fn format_feed_date(date: NaiveDate) -> String {
    date.format(TODAY_DATE_FORMAT).to_string()
}

/// Initialize tracing for one-shot commands
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
