mod capability;
mod company;
mod price;
mod sentiment;
mod upstream_config;
pub mod language;

pub use capability::Capability;
pub use company::{normalize_symbol, parse_symbol_list, TrackedEntity};
pub use price::{HistoryMap, HistoryPoint, MergedPoint, MergedSeries, PriceSeriesMap, Quote, QuoteMap};
pub use sentiment::{DayBucket, NewsEntity, NewsResponse, SentimentDay, SentimentHistory};
pub use upstream_config::{Endpoint, UpstreamConfig};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Localized text keyed by message key
pub type StringBundle = BTreeMap<String, String>;

/// Strings capability response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringsResponse {
    pub resource_strings: StringBundle,
}

/// `/tweets` response: both social payloads, opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetsResponse {
    pub tweets: serde_json::Value,
    pub sentiment: serde_json::Value,
}
