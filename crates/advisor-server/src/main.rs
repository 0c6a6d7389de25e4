//! Stock Consultant HTTP Server
//!
//! Axum-based server exposing the portfolio advisor over REST, with a
//! background task keeping the market snapshot fresh.

mod config;
mod handlers;
mod refresher;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advisor_billing::{BillingClient, JsonFileUsageStore, PricingConfig};
use portfolio_advisor::market::{CsvMarketSource, StaticMarketSource};
use portfolio_advisor::{Advisor, MarketCache, MarketDataSource};

use crate::config::{MarketSourceKind, ServerConfig};
use crate::handlers::{analyze_portfolio, get_market, get_usage, health_check, integrations_status};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    // Market data
    let market_source: Arc<dyn MarketDataSource> = match &config.market_source {
        MarketSourceKind::Csv(path) => Arc::new(CsvMarketSource::new(path.clone())),
        MarketSourceKind::Demo => Arc::new(StaticMarketSource::demo()),
    };
    let market = Arc::new(MarketCache::new());
    if let Err(e) = market.refresh(market_source.as_ref()).await {
        tracing::warn!(error = %e, "starting with an empty market snapshot");
    }
    let _refresher = refresher::spawn(market.clone(), market_source.clone(), config.refresh_interval);

    // Usage and billing
    let usage = Arc::new(JsonFileUsageStore::new(config.usage_file.clone()));
    let billing = Arc::new(
        BillingClient::new(config.billing_api_key.clone(), PricingConfig::default())
            .with_ledger_file(config.billing_file.clone()),
    );

    let state = AppState {
        advisor: Arc::new(Advisor::new(config.thresholds.clone())),
        market,
        market_source,
        usage,
        billing,
    };

    // CORS
    let cors = match config.cors_allow_origin.as_deref() {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/market", get(get_market))
        .route("/api/analyze", post(analyze_portfolio))
        .route("/api/usage", get(get_usage))
        .route("/api/integrations/status", get(integrations_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Server running on http://{}", config.bind_addr);
    tracing::info!("   GET  /health");
    tracing::info!("   GET  /api/market");
    tracing::info!("   POST /api/analyze");
    tracing::info!("   GET  /api/usage");
    tracing::info!("   GET  /api/integrations/status");

    axum::serve(listener, app).await?;

    Ok(())
}
