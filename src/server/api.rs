use crate::error::AppError;
use crate::models::{language::resolve_language, normalize_symbol, parse_symbol_list};
use crate::server::AppState;
use crate::services::{write_api_log_entry, AggregationRequest, ApiRequestMetrics};
use axum::{
    extract::{Json, State},
    http::{header::ACCEPT_LANGUAGE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Query parameters for /strings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StringsQuery {
    /// Explicit language code; falls back to Accept-Language
    pub language: Option<String>,
}

/// Query parameters for /companylookup
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CompanyLookupQuery {
    /// Free-text company name or symbol fragment
    pub company: Option<String>,
}

/// Query parameters for /stocknews
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StockNewsQuery {
    pub symbol: Option<String>,
    pub language: Option<String>,
}

/// Query parameters for /stockprice
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StockPriceQuery {
    /// Comma-separated symbols; may also be repeated (symbols=IBM&symbols=AAPL)
    pub symbols: Option<Vec<String>>,
}

/// Query parameters for /tweets
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TweetsQuery {
    pub symbol: Option<String>,
    /// Accepted in place of `symbol`
    pub symbols: Option<String>,
    pub entity: Option<String>,
    pub language: Option<String>,
}

/// Query parameters for /sentiment-history
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SentimentHistoryQuery {
    pub symbol: Option<String>,
    /// Accepted in place of `symbol`
    pub symbols: Option<String>,
    /// Restrict the news roll-up to one entity
    pub entity: Option<String>,
}

/// GET /strings - localized string bundle, cached per language
#[instrument(skip(state, headers))]
pub async fn strings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StringsQuery>,
) -> Response {
    let language = negotiate_language(params.language.as_deref(), &headers);
    let request = AggregationRequest::Strings {
        language: language.clone(),
    };
    run(&state, "/strings", Ok(request), Some(language)).await
}

/// GET /companylookup?company=IBM - company search passthrough
#[instrument(skip(state))]
pub async fn company_lookup_handler(
    State(state): State<AppState>,
    Query(params): Query<CompanyLookupQuery>,
) -> Response {
    let request = required("company", params.company).map(|name| AggregationRequest::CompanyLookup { name });
    run(&state, "/companylookup", request, None).await
}

/// GET /stocknews?symbol=IBM&language=en - news passthrough
#[instrument(skip(state, headers))]
pub async fn stock_news_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<StockNewsQuery>,
) -> Response {
    let language = negotiate_language(params.language.as_deref(), &headers);
    let request = required_symbol(params.symbol).map(|symbol| AggregationRequest::StockNews {
        symbol,
        language: language.clone(),
    });
    run(&state, "/stocknews", request, Some(language)).await
}

/// GET /stockprice?symbols=IBM,AAPL - merged quote + history per symbol
///
/// Responds with `{symbol: [{change, symbol, last, date, week_52_high, week_52_low}]}`,
/// history points oldest first followed by today's point.
#[instrument(skip(state))]
pub async fn stock_price_handler(
    State(state): State<AppState>,
    Query(params): Query<StockPriceQuery>,
) -> Response {
    let symbols = parse_symbol_list(&params.symbols.unwrap_or_default());
    let request = if symbols.is_empty() {
        Err(AppError::InvalidInput("missing query parameter 'symbols'".to_string()))
    } else {
        Ok(AggregationRequest::StockPrice { symbols })
    };
    run(&state, "/stockprice", request, None).await
}

/// GET /tweets?symbol=IBM&entity=Watson&language=en - social posts and sentiment
#[instrument(skip(state, headers))]
pub async fn tweets_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TweetsQuery>,
) -> Response {
    let language = negotiate_language(params.language.as_deref(), &headers);
    let request = required_symbol(params.symbol.or(params.symbols)).and_then(|symbol| {
        let entity = required("entity", params.entity)?;
        Ok(AggregationRequest::Tweets {
            symbol,
            entity,
            language: language.clone(),
        })
    });
    run(&state, "/tweets", request, Some(language)).await
}

/// GET /sentiment-history?symbol=IBM - 31 days of news sentiment, oldest first
#[instrument(skip(state))]
pub async fn sentiment_history_handler(
    State(state): State<AppState>,
    Query(params): Query<SentimentHistoryQuery>,
) -> Response {
    let entity = params
        .entity
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    let request = required_symbol(params.symbol.or(params.symbols))
        .map(|symbol| AggregationRequest::SentimentHistory { symbol, entity });
    run(&state, "/sentiment-history", request, None).await
}

fn negotiate_language(explicit: Option<&str>, headers: &HeaderMap) -> String {
    let accept_language = headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
    resolve_language(explicit, accept_language)
}

fn required(name: &str, value: Option<String>) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("missing query parameter '{}'", name)))
}

fn required_symbol(value: Option<String>) -> Result<String, AppError> {
    required("symbol", value).map(|symbol| normalize_symbol(&symbol))
}

/// Execute a request, log its metrics and shape the HTTP response
async fn run(
    state: &AppState,
    endpoint: &'static str,
    request: Result<AggregationRequest, AppError>,
    language: Option<String>,
) -> Response {
    let mut metrics = ApiRequestMetrics::new(endpoint, Utc::now());
    metrics.language = language;

    let outcome = match request {
        Ok(request) => {
            metrics.symbol_count = request.symbol_count();
            debug!(?request, "Handling aggregation request");
            state.service.handle(request).await
        }
        Err(err) => Err(err),
    };

    match outcome {
        Ok(response) => {
            metrics.upstream_calls = response.upstream_calls;
            metrics.complete(response.status);
            write_api_log_entry(&metrics);

            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
            (status, Json(response.body)).into_response()
        }
        Err(err) => {
            warn!(endpoint, error = %err, "Aggregation request failed");
            metrics.fail(err.status_code(), err.to_string());
            write_api_log_entry(&metrics);
            error_response(err)
        }
    }
}

/// Upstream error body when there is one, otherwise `{"error": message}`
pub fn error_response(err: AppError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = err
        .upstream_body()
        .cloned()
        .unwrap_or_else(|| serde_json::json!({ "error": err.to_string() }));
    (status, Json(body)).into_response()
}
