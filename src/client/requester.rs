use crate::constants::CLIENT_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use crate::models::{NewsResponse, PriceSeriesMap, SentimentHistory, StringBundle, TweetsResponse};
use crate::services::http_transport::{HttpRequest, ReqwestTransport, SharedTransport};
use crate::utils::get_api_base_url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the aggregation server's HTTP endpoints
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: SharedTransport,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: SharedTransport) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Client for `STOCKINSIGHTS_API` over reqwest
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(get_api_base_url(), Arc::new(ReqwestTransport::new()?)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn strings(&self, language: Option<&str>) -> Result<StringBundle> {
        let mut query = Vec::new();
        if let Some(language) = language {
            query.push(("language", language.to_string()));
        }
        self.get("/strings", query).await
    }

    pub async fn company_lookup(&self, company: &str) -> Result<Value> {
        self.get("/companylookup", vec![("company", company.to_string())])
            .await
    }

    pub async fn stock_news(&self, symbol: &str, language: &str) -> Result<NewsResponse> {
        self.get(
            "/stocknews",
            vec![("symbol", symbol.to_string()), ("language", language.to_string())],
        )
        .await
    }

    pub async fn stock_price(&self, symbols: &[String]) -> Result<PriceSeriesMap> {
        self.get("/stockprice", vec![("symbols", symbols.join(","))])
            .await
    }

    pub async fn tweets(&self, symbol: &str, entity: &str, language: &str) -> Result<TweetsResponse> {
        self.get(
            "/tweets",
            vec![
                ("symbol", symbol.to_string()),
                ("entity", entity.to_string()),
                ("language", language.to_string()),
            ],
        )
        .await
    }

    pub async fn sentiment_history(&self, symbol: &str) -> Result<SentimentHistory> {
        self.get("/sentiment-history", vec![("symbol", symbol.to_string())])
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: Vec<(&str, String)>) -> Result<T> {
        let mut request = HttpRequest::get(format!("{}{}", self.base_url, path))
            .with_header("Accept", "application/json")
            .with_timeout(Duration::from_secs(CLIENT_TIMEOUT_SECS));
        for (key, value) in query {
            request = request.with_query(key, value);
        }

        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(response.body);
            warn!(path, status = response.status, "Server request failed");
            return Err(AppError::Server {
                status: response.status,
                message,
            });
        }

        debug!(path, bytes = response.body.len(), "Server request completed");
        serde_json::from_str(&response.body)
            .map_err(|e| AppError::Parse(format!("unexpected {} response: {}", path, e)))
    }
}
