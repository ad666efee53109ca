use crate::constants::DEFAULT_UPSTREAM_TIMEOUT_SECS;
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outgoing GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// URL without query string
    pub url: String,
    /// Query pairs in insertion order
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// First value of a query key
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: numeric status plus body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport contract shared by the upstream client and the client-side requester
///
/// Timeouts are enforced here; callers only see a `Network` error.
pub trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>>;
}

pub type SharedTransport = Arc<dyn HttpTransport>;

/// Production transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stockinsights/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
        Box::pin(async move {
            let url = reqwest::Url::parse_with_params(&request.url, &request.query)
                .map_err(|e| AppError::InvalidInput(format!("invalid url '{}': {}", request.url, e)))?;
            let mut builder = self.client.get(url).timeout(request.timeout);

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            debug!(url = %request.url, "Sending request");
            // reqwest's Display carries the full URL, query (and client_id) included
            let response = builder.send().await.map_err(|e| {
                let kind = if e.is_timeout() {
                    "request timeout"
                } else if e.is_connect() {
                    "connection failed"
                } else {
                    "request failed"
                };
                AppError::Network(format!("{}: {} (url: {})", kind, e.without_url(), request.url))
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                AppError::Network(format!(
                    "Failed to read response body: {} (url: {})",
                    e.without_url(),
                    request.url
                ))
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}
