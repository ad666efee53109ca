use crate::error::{AppError, Result};
use crate::models::{Capability, UpstreamConfig};
use crate::services::http_transport::{HttpRequest, SharedTransport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Raw result of one capability call
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub capability: Capability,
    pub status: u16,
    pub body: Value,
}

/// Error code an upstream reports inside its JSON body (`httpCode`)
///
/// Some providers answer 200 with the real status embedded in the payload.
pub fn reported_status(body: &Value) -> Option<u16> {
    match body.get("httpCode")? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Typed request wrapper over every upstream capability
///
/// One call per `fetch`, no retries and no local state. Timeouts belong to
/// the transport.
#[derive(Clone)]
pub struct UpstreamClient {
    config: Arc<UpstreamConfig>,
    transport: SharedTransport,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig, transport: SharedTransport) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Call a capability and return its status and JSON body
    ///
    /// Missing required params fail before any network traffic. A non-2xx
    /// status, or an error `httpCode` inside a 2xx body, becomes
    /// [`AppError::Upstream`].
    pub async fn fetch(&self, capability: Capability, params: &[(&str, String)]) -> Result<UpstreamResponse> {
        for required in capability.required_params() {
            let present = params
                .iter()
                .any(|(key, value)| key == required && !value.trim().is_empty());
            if !present {
                return Err(AppError::InvalidInput(format!(
                    "{} requires parameter '{}'",
                    capability, required
                )));
            }
        }

        let endpoint = self.config.endpoint(capability)?;
        let mut request = HttpRequest::get(format!("{}{}", endpoint.url, capability.path()))
            .with_timeout(self.config.timeout)
            .with_query("client_id", endpoint.client_id.clone());
        for (key, value) in params {
            request = request.with_query(*key, value.clone());
        }

        let started = Instant::now();
        let response = self.transport.execute(request).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let body = if response.body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&response.body) {
                Ok(body) => body,
                Err(e) if response.is_success() => {
                    return Err(AppError::InputConsistency(format!(
                        "{} returned a non-JSON body: {}",
                        capability, e
                    )));
                }
                Err(_) => Value::Null,
            }
        };

        let embedded = reported_status(&body).filter(|code| *code >= 400);
        if !response.is_success() || embedded.is_some() {
            let status = embedded.unwrap_or(response.status);
            warn!(%capability, status, elapsed_ms, "Upstream call failed");
            return Err(AppError::Upstream {
                capability,
                status,
                body: (!body.is_null()).then_some(body),
            });
        }

        debug!(%capability, status = response.status, elapsed_ms, "Upstream call completed");
        Ok(UpstreamResponse {
            capability,
            status: response.status,
            body,
        })
    }

    /// Call a capability and convert its body into a typed schema
    ///
    /// A body that does not fit the schema is an input consistency error.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        capability: Capability,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self.fetch(capability, params).await?;
        serde_json::from_value(response.body).map_err(|e| {
            AppError::InputConsistency(format!("unexpected {} response shape: {}", capability, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Endpoint, Quote};
    use crate::services::http_transport::{HttpResponse, HttpTransport};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    /// Replays one canned response and records requests
    struct CannedTransport {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse::new(status, body),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl HttpTransport for CannedTransport {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
            self.seen.lock().unwrap().push(request);
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    fn client(transport: Arc<CannedTransport>) -> UpstreamClient {
        let config = UpstreamConfig::default()
            .with_endpoint(Capability::Quote, Endpoint::new("https://quotes.test/", "quote-id"))
            .with_endpoint(Capability::CompanyLookup, Endpoint::new("https://lookup.test", "lookup-id"));
        UpstreamClient::new(config, transport)
    }

    #[tokio::test]
    async fn test_fetch_builds_credentialed_request() {
        let transport = CannedTransport::new(200, "[]");
        let upstream = client(transport.clone());

        let response = upstream
            .fetch(Capability::Quote, &[("symbols", "IBM,AAPL".to_string())])
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, serde_json::json!([]));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://quotes.test/markets/quote");
        assert_eq!(seen[0].query_value("client_id"), Some("quote-id"));
        assert_eq!(seen[0].query_value("symbols"), Some("IBM,AAPL"));
    }

    #[tokio::test]
    async fn test_missing_required_param_is_caller_error() {
        let transport = CannedTransport::new(200, "[]");
        let upstream = client(transport.clone());

        let err = upstream.fetch(Capability::Quote, &[]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = upstream
            .fetch(Capability::Quote, &[("symbols", "  ".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_failure() {
        let transport = CannedTransport::new(503, r#"{"message":"down"}"#);
        let upstream = client(transport);

        let err = upstream
            .fetch(Capability::Quote, &[("symbols", "IBM".to_string())])
            .await
            .unwrap_err();
        match err {
            AppError::Upstream { capability, status, body } => {
                assert_eq!(capability, Capability::Quote);
                assert_eq!(status, 503);
                assert_eq!(body, Some(serde_json::json!({"message": "down"})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embedded_http_code_is_reported() {
        let transport = CannedTransport::new(200, r#"{"httpCode":"401","message":"bad client"}"#);
        let upstream = client(transport);

        let err = upstream
            .fetch(Capability::CompanyLookup, &[("name", "ibm".to_string())])
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_unconfigured_capability() {
        let transport = CannedTransport::new(200, "{}");
        let upstream = client(transport);

        let err = upstream
            .fetch(Capability::History, &[("symbols", "IBM".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_fetch_as_shape_mismatch() {
        let transport = CannedTransport::new(200, r#"{"not":"a list"}"#);
        let upstream = client(transport);

        let err = upstream
            .fetch_as::<Vec<Quote>>(Capability::Quote, &[("symbols", "IBM".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InputConsistency(_)));
    }

    #[test]
    fn test_reported_status_forms() {
        assert_eq!(reported_status(&serde_json::json!({"httpCode": 404})), Some(404));
        assert_eq!(reported_status(&serde_json::json!({"httpCode": "500"})), Some(500));
        assert_eq!(reported_status(&serde_json::json!({"httpCode": true})), None);
        assert_eq!(reported_status(&serde_json::json!([1, 2])), None);
    }
}
