//! Per-request orchestration
//!
//! Resolves an [`AggregationRequest`] to its upstream calls, runs the
//! independent ones concurrently, joins them through the matching merger and
//! shapes the JSON payload. There is no partial success: any required call
//! failing fails the request.

use crate::constants::DEFAULT_LANGUAGE;
use crate::error::{AppError, Result};
use crate::models::language::best_supported;
use crate::models::{
    Capability, HistoryMap, PriceSeriesMap, Quote, SentimentHistory, StringBundle, StringsResponse,
    TweetsResponse, UpstreamConfig,
};
use crate::services::http_transport::{ReqwestTransport, SharedTransport};
use crate::services::price_history::{index_quotes, PriceHistoryMerger};
use crate::services::response_cache::ResponseCache;
use crate::services::sentiment_window::{SentimentWindow, SentimentWindowAggregator};
use crate::services::upstream::{reported_status, UpstreamClient};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// One incoming aggregation request, already validated for shape
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationRequest {
    Strings { language: String },
    CompanyLookup { name: String },
    StockNews { symbol: String, language: String },
    StockPrice { symbols: Vec<String> },
    Tweets { symbol: String, entity: String, language: String },
    SentimentHistory { symbol: String, entity: Option<String> },
}

impl AggregationRequest {
    /// Endpoint path the request arrives on
    pub fn endpoint(&self) -> &'static str {
        match self {
            AggregationRequest::Strings { .. } => "/strings",
            AggregationRequest::CompanyLookup { .. } => "/companylookup",
            AggregationRequest::StockNews { .. } => "/stocknews",
            AggregationRequest::StockPrice { .. } => "/stockprice",
            AggregationRequest::Tweets { .. } => "/tweets",
            AggregationRequest::SentimentHistory { .. } => "/sentiment-history",
        }
    }

    /// Number of symbols the request covers
    pub fn symbol_count(&self) -> usize {
        match self {
            AggregationRequest::StockPrice { symbols } => symbols.len(),
            AggregationRequest::StockNews { .. }
            | AggregationRequest::Tweets { .. }
            | AggregationRequest::SentimentHistory { .. } => 1,
            AggregationRequest::Strings { .. } | AggregationRequest::CompanyLookup { .. } => 0,
        }
    }
}

/// Shaped response: HTTP status plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResponse {
    pub status: u16,
    pub body: Value,
    /// Upstream calls issued to build this response
    pub upstream_calls: usize,
}

impl AggregationResponse {
    fn ok<T: Serialize>(payload: &T, upstream_calls: usize) -> Result<Self> {
        Ok(Self {
            status: 200,
            body: serde_json::to_value(payload)?,
            upstream_calls,
        })
    }
}

/// Server-side aggregation engine
///
/// Owns the string bundle cache; every other piece of data is request-scoped.
pub struct AggregationService {
    upstream: UpstreamClient,
    sentiment: SentimentWindowAggregator,
    strings: ResponseCache<StringBundle>,
}

pub type SharedAggregationService = Arc<AggregationService>;

impl AggregationService {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            sentiment: SentimentWindowAggregator::new(upstream.clone()),
            upstream,
            strings: ResponseCache::new(),
        }
    }

    pub fn with_transport(config: UpstreamConfig, transport: SharedTransport) -> Self {
        Self::new(UpstreamClient::new(config, transport))
    }

    /// Service wired to the environment's upstream endpoints over reqwest
    pub fn from_env() -> Result<Self> {
        let config = UpstreamConfig::from_env()?;
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Run one request end to end
    #[instrument(skip(self), fields(endpoint = request.endpoint()))]
    pub async fn handle(&self, request: AggregationRequest) -> Result<AggregationResponse> {
        match request {
            AggregationRequest::Strings { language } => {
                let cached = self.strings.get(bundle_locale(&language)).await.is_some();
                let bundle = self.strings(&language).await?;
                AggregationResponse::ok(bundle.as_ref(), if cached { 0 } else { 1 })
            }
            AggregationRequest::CompanyLookup { name } => {
                let body = self.company_lookup(&name).await?;
                Ok(passthrough(body, 1))
            }
            AggregationRequest::StockNews { symbol, language } => {
                let body = self.stock_news(&symbol, &language).await?;
                Ok(passthrough(body, 1))
            }
            AggregationRequest::StockPrice { symbols } => {
                let merged = self.stock_price(&symbols).await?;
                AggregationResponse::ok(&merged, 2)
            }
            AggregationRequest::Tweets { symbol, entity, language } => {
                let tweets = self.tweets(&symbol, &entity, &language).await?;
                AggregationResponse::ok(&tweets, 2)
            }
            AggregationRequest::SentimentHistory { symbol, entity } => {
                let window = SentimentWindow::trailing();
                let history = self
                    .sentiment_history_over(&symbol, entity.as_deref(), &window)
                    .await?;
                AggregationResponse::ok(&history, window.len())
            }
        }
    }

    /// String bundle for a language, fetched once per language code
    pub async fn strings(&self, language: &str) -> Result<Arc<StringBundle>> {
        let language = bundle_locale(language);
        self.strings
            .get_or_populate(language, move || async move {
                let response: StringsResponse = self
                    .upstream
                    .fetch_as(Capability::Strings, &[("languageId", language.to_string())])
                    .await?;
                info!(language, keys = response.resource_strings.len(), "Fetched string bundle");
                Ok(response.resource_strings)
            })
            .await
    }

    /// Free-text company search, upstream JSON passed through
    pub async fn company_lookup(&self, name: &str) -> Result<Value> {
        let response = self
            .upstream
            .fetch(Capability::CompanyLookup, &[("name", name.to_string())])
            .await?;
        Ok(response.body)
    }

    /// News for a symbol in a language, upstream JSON passed through
    pub async fn stock_news(&self, symbol: &str, language: &str) -> Result<Value> {
        let response = self
            .upstream
            .fetch(
                Capability::News,
                &[("symbol", symbol.to_string()), ("language", language.to_string())],
            )
            .await?;
        Ok(response.body)
    }

    /// Merged price series for the current UTC day
    pub async fn stock_price(&self, symbols: &[String]) -> Result<PriceSeriesMap> {
        self.stock_price_with(symbols, PriceHistoryMerger::for_today())
            .await
    }

    /// Quote and history fetched together, then merged
    pub async fn stock_price_with(
        &self,
        symbols: &[String],
        merger: PriceHistoryMerger,
    ) -> Result<PriceSeriesMap> {
        if symbols.is_empty() {
            return Err(AppError::InvalidInput("at least one symbol is required".to_string()));
        }
        let joined = symbols.join(",");

        let quote_params = [("symbols", joined.clone())];
        let history_params = [("symbols", joined)];
        let (quotes, history) = tokio::try_join!(
            self.upstream.fetch_as::<Vec<Quote>>(Capability::Quote, &quote_params),
            self.upstream.fetch_as::<HistoryMap>(Capability::History, &history_params),
        )?;

        let merged = merger.merge(&index_quotes(quotes), history)?;
        info!(
            symbols = ?symbols,
            series = merged.len(),
            points = merged.values().map(Vec::len).sum::<usize>(),
            "Merged stock price data"
        );
        Ok(merged)
    }

    /// Social posts and social sentiment fetched together
    pub async fn tweets(&self, symbol: &str, entity: &str, language: &str) -> Result<TweetsResponse> {
        let tweet_params = [
            ("symbol", symbol.to_string()),
            ("entity", entity.to_string()),
            ("language", language.to_string()),
        ];
        let sentiment_params = [("symbol", symbol.to_string()), ("entity", entity.to_string())];

        let (tweets, sentiment) = tokio::try_join!(
            self.upstream.fetch(Capability::Tweets, &tweet_params),
            self.upstream.fetch(Capability::Sentiment, &sentiment_params),
        )?;

        Ok(TweetsResponse {
            tweets: tweets.body,
            sentiment: sentiment.body,
        })
    }

    /// 31-day sentiment history ending today (UTC)
    pub async fn sentiment_history(&self, symbol: &str, entity: Option<&str>) -> Result<SentimentHistory> {
        self.sentiment_history_over(symbol, entity, &SentimentWindow::trailing())
            .await
    }

    pub async fn sentiment_history_over(
        &self,
        symbol: &str,
        entity: Option<&str>,
        window: &SentimentWindow,
    ) -> Result<SentimentHistory> {
        self.sentiment.aggregate(symbol, entity, window).await
    }
}

/// Passthrough body, honouring a status code the upstream embedded in it
/// Supported locale a bundle is cached under; anything else shares the `en` bundle
fn bundle_locale(language: &str) -> &'static str {
    best_supported(language).unwrap_or(DEFAULT_LANGUAGE)
}

fn passthrough(body: Value, upstream_calls: usize) -> AggregationResponse {
    let status = reported_status(&body)
        .filter(|code| (200..600).contains(code))
        .unwrap_or(200);
    AggregationResponse {
        status,
        body,
        upstream_calls,
    }
}
