//! Shared constants
//!
//! Locale set, sentiment window geometry, upstream query limits and the
//! environment variable names read at startup.

/// Locales the string bundles exist for
///
/// Order matters: when only the primary language of a requested locale
/// matches (e.g. `zh-TW`), the first entry with that language wins.
pub const SUPPORTED_LOCALES: &[&str] = &[
    "en", "zh-Hant", "zh-Hans", "fr", "de", "it", "ja", "pt-br", "es",
];

/// Fallback language when negotiation finds nothing
pub const DEFAULT_LANGUAGE: &str = "en";

/// Days looked back by the sentiment history, today excluded
///
/// The window therefore holds `SENTIMENT_WINDOW_DAYS + 1` day buckets.
pub const SENTIMENT_WINDOW_DAYS: i64 = 30;

/// Top entities requested per sentiment day bucket (`elimit`)
pub const SENTIMENT_ENTITY_LIMIT: u32 = 100;

/// Articles requested per sentiment day bucket (`alimit`); only entities matter
pub const SENTIMENT_ARTICLE_LIMIT: u32 = 0;

/// Synthetic "today" date format, no zero padding (matches the history feed)
pub const TODAY_DATE_FORMAT: &str = "%Y-%-m-%-d";

/// Default upstream call timeout
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout of the CLI client talking to the aggregation server
pub const CLIENT_TIMEOUT_SECS: u64 = 60;

/// Default HTTP port for `serve`
pub const DEFAULT_PORT: u16 = 3000;

/// Default durable watchlist file
pub const DEFAULT_WATCHLIST_PATH: &str = "watchlist.json";

/// Default server base URL for the client-side requester
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

pub const UPSTREAM_TIMEOUT_ENV: &str = "UPSTREAM_TIMEOUT_SECS";
pub const PORT_ENV: &str = "PORT";
pub const WATCHLIST_PATH_ENV: &str = "WATCHLIST_PATH";
pub const API_BASE_URL_ENV: &str = "STOCKINSIGHTS_API";
