use axum::body::{to_bytes, Body};
use axum::http::{header::ACCEPT_LANGUAGE, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use stockinsights::models::{Capability, Endpoint, UpstreamConfig};
use stockinsights::server::{router, AppState};
use stockinsights::services::{AggregationService, HttpRequest, HttpResponse, HttpTransport};
use stockinsights::Result;
use tower::ServiceExt;

/// Upstream stand-in: one canned answer per capability path
#[derive(Default)]
struct FakeUpstream {
    routes: HashMap<&'static str, (u16, String)>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl FakeUpstream {
    fn with(mut self, path: &'static str, status: u16, body: Value) -> Self {
        self.routes.insert(path, (status, body.to_string()));
        self
    }

    fn seen_paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.split_once(".test").map(|(_, p)| p.to_string()).unwrap_or_default())
            .collect()
    }
}

impl HttpTransport for FakeUpstream {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
        let path = request
            .url
            .split_once(".test")
            .map(|(_, p)| p.to_string())
            .unwrap_or_default();
        self.seen.lock().unwrap().push(request);
        let response = match self.routes.get(path.as_str()) {
            Some((status, body)) => HttpResponse::new(*status, body.clone()),
            None => HttpResponse::new(404, r#"{"message":"no such route"}"#),
        };
        Box::pin(async move { Ok(response) })
    }
}

fn app(upstream: Arc<FakeUpstream>) -> Router {
    let mut config = UpstreamConfig::default();
    for capability in Capability::all() {
        config = config.with_endpoint(
            capability,
            Endpoint::new(format!("https://{}.test", capability.as_str()), "client"),
        );
    }
    let service = AggregationService::with_transport(config, upstream);
    router(AppState::new(Arc::new(service)))
}

async fn get(app: Router, uri: &str, accept_language: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = accept_language {
        builder = builder.header(ACCEPT_LANGUAGE, value);
    }
    let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn stockprice_merges_quote_and_history() {
    let upstream = Arc::new(
        FakeUpstream::default()
            .with(
                "/markets/quote",
                200,
                json!([
                    {"symbol": "IBM", "last": 140.0, "change": 0, "week_52_high": 180.0, "week_52_low": 110.0},
                    {"symbol": "AAPL", "last": 99.0, "change": null, "week_52_high": 130.0, "week_52_low": 90.0}
                ]),
            )
            .with(
                "/markets/history",
                200,
                json!({
                    "IBM": [{"date": "2016-3-3", "open": 130.0, "close": 131.5}],
                    "AAPL": [{"date": "2016-3-3", "open": 100.0, "close": 98.0}]
                }),
            ),
    );

    let (status, body) = get(app(upstream.clone()), "/stockprice?symbols=ibm,AAPL", None).await;

    assert_eq!(status, StatusCode::OK);
    let ibm = body["IBM"].as_array().unwrap();
    assert_eq!(ibm.len(), 2);
    assert_eq!(ibm[0]["change"], 1.5);
    // every quote change is falsy, so today reuses yesterday's change
    assert_eq!(ibm[1]["change"], 1.5);
    assert_eq!(ibm[1]["last"], 140.0);
    assert_eq!(body["AAPL"][1]["change"], -2.0);
    assert_eq!(body["AAPL"][1]["week_52_high"], 130.0);

    let seen = upstream.seen.lock().unwrap();
    assert!(seen.iter().all(|r| r.query_value("symbols") == Some("IBM,AAPL")));
}

#[tokio::test]
async fn stockprice_without_symbols_is_bad_request() {
    let upstream = Arc::new(FakeUpstream::default());
    let (status, body) = get(app(upstream.clone()), "/stockprice", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("symbols"));
    assert!(upstream.seen_paths().is_empty());
}

#[tokio::test]
async fn upstream_failure_returns_500_with_its_body() {
    let upstream = Arc::new(
        FakeUpstream::default()
            .with("/markets/quote", 200, json!([]))
            .with("/markets/history", 503, json!({"message": "maintenance"})),
    );

    let (status, body) = get(app(upstream), "/stockprice?symbols=IBM", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "maintenance"}));
}

#[tokio::test]
async fn reported_http_code_becomes_status() {
    let upstream = Arc::new(FakeUpstream::default().with(
        "/markets/find",
        200,
        json!({"httpCode": "401", "httpMessage": "Unauthorized"}),
    ));

    let (status, body) = get(app(upstream), "/companylookup?company=ibm", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["httpMessage"], "Unauthorized");
}

#[tokio::test]
async fn companylookup_passes_through() {
    let upstream = Arc::new(FakeUpstream::default().with(
        "/markets/find",
        200,
        json!([{"symbol": "IBM", "description": "International Business Machines"}]),
    ));

    let (status, body) = get(app(upstream.clone()), "/companylookup?company=int", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["symbol"], "IBM");
    assert_eq!(upstream.seen.lock().unwrap()[0].query_value("name"), Some("int"));
}

#[tokio::test]
async fn strings_negotiates_language_and_caches() {
    let upstream = Arc::new(FakeUpstream::default().with(
        "/bundles/stock_strings/strings",
        200,
        json!({"resourceStrings": {"title": "Aperçu boursier"}}),
    ));
    let app = app(upstream.clone());

    let (status, body) = get(app.clone(), "/strings", Some("fr;q=0.9, xx;q=0.8")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Aperçu boursier");

    let (status, _) = get(app, "/strings", Some("fr")).await;
    assert_eq!(status, StatusCode::OK);

    let seen = upstream.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].query_value("languageId"), Some("fr"));
}

#[tokio::test]
async fn stocknews_uses_explicit_language() {
    let upstream = Arc::new(FakeUpstream::default().with("/news/find", 200, json!({"articles": [], "entities": []})));

    let (status, _) = get(app(upstream.clone()), "/stocknews?symbol=IBM&language=ja", Some("de")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.seen.lock().unwrap()[0].query_value("language"), Some("ja"));
}

#[tokio::test]
async fn tweets_joins_both_payloads() {
    let upstream = Arc::new(
        FakeUpstream::default()
            .with("/twitter/find", 200, json!([{"text": "IBM Watson wins"}]))
            .with("/sentiment/find", 200, json!({"positive": 3, "negative": 1})),
    );

    let (status, body) = get(app(upstream.clone()), "/tweets?symbols=IBM&entity=Watson", Some("en-GB")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tweets"][0]["text"], "IBM Watson wins");
    assert_eq!(body["sentiment"]["positive"], 3);

    let mut paths = upstream.seen_paths();
    paths.sort();
    assert_eq!(paths, vec!["/sentiment/find", "/twitter/find"]);
}

#[tokio::test]
async fn tweets_requires_entity() {
    let upstream = Arc::new(FakeUpstream::default());
    let (status, _) = get(app(upstream), "/tweets?symbol=IBM", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sentiment_history_returns_31_days_with_nulls() {
    let upstream = Arc::new(FakeUpstream::default().with(
        "/news/find",
        200,
        json!({"entities": [{"text": "Watson", "count": 0, "averageSentiment": 0.4}]}),
    ));

    let (status, body) = get(app(upstream.clone()), "/sentiment-history?symbol=IBM", None).await;

    assert_eq!(status, StatusCode::OK);
    let days = body["sentiment"].as_array().unwrap();
    assert_eq!(days.len(), 31);
    assert!(days.iter().all(|d| d["sentiment"].is_null()));
    assert_eq!(body["entities"].as_object().unwrap().len(), 31);

    let dates: Vec<&str> = days.iter().map(|d| d["date"].as_str().unwrap()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(upstream.seen_paths().len(), 31);
}

#[tokio::test]
async fn symbol_parameters_are_uppercased() {
    let upstream = Arc::new(
        FakeUpstream::default()
            .with("/news/find", 200, json!({"articles": [], "entities": []}))
            .with("/twitter/find", 200, json!([]))
            .with("/sentiment/find", 200, json!({})),
    );
    let app = app(upstream.clone());

    let (status, _) = get(app.clone(), "/stocknews?symbol=ibm", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(app.clone(), "/tweets?symbol=%20ibm%20&entity=Watson", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(app, "/sentiment-history?symbols=ibm", None).await;
    assert_eq!(status, StatusCode::OK);

    let seen = upstream.seen.lock().unwrap();
    assert_eq!(seen.len(), 1 + 2 + 31);
    assert!(seen.iter().all(|r| r.query_value("symbol") == Some("IBM")));
}
