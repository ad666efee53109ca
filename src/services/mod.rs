pub mod aggregation;
pub mod api_logging;
pub mod http_transport;
pub mod price_history;
pub mod response_cache;
pub mod sentiment_window;
pub mod upstream;

pub use aggregation::{AggregationRequest, AggregationResponse, AggregationService, SharedAggregationService};
pub use api_logging::{write_api_log_entry, ApiRequestMetrics, ApiStatus};
pub use http_transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, SharedTransport};
pub use price_history::{index_quotes, use_previous_change_values, PriceHistoryMerger};
pub use response_cache::ResponseCache;
pub use sentiment_window::{weighted_average, SentimentWindow, SentimentWindowAggregator};
pub use upstream::{reported_status, UpstreamClient, UpstreamResponse};
