pub mod api;

use crate::services::SharedAggregationService;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: SharedAggregationService,
}

impl AppState {
    pub fn new(service: SharedAggregationService) -> Self {
        Self { service }
    }
}

/// All aggregation routes with CORS and request tracing applied
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/strings", get(api::strings_handler))
        .route("/companylookup", get(api::company_lookup_handler))
        .route("/stocknews", get(api::stock_news_handler))
        .route("/stockprice", get(api::stock_price_handler))
        .route("/tweets", get(api::tweets_handler))
        .route("/sentiment-history", get(api::sentiment_history_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the axum server
pub async fn serve(service: SharedAggregationService, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting stockinsights server");

    let configured = service.upstream().config().configured();
    if configured.is_empty() {
        tracing::warn!("No upstream endpoints configured; every aggregation call will fail");
    } else {
        tracing::info!(capabilities = ?configured, "Upstream endpoints configured");
    }

    tracing::info!("Registering routes:");
    tracing::info!("  GET /strings?language=fr");
    tracing::info!("  GET /companylookup?company=IBM");
    tracing::info!("  GET /stocknews?symbol=IBM&language=en");
    tracing::info!("  GET /stockprice?symbols=IBM,AAPL");
    tracing::info!("  GET /tweets?symbol=IBM&entity=Watson&language=en");
    tracing::info!("  GET /sentiment-history?symbol=IBM");

    let app = router(AppState::new(service));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
