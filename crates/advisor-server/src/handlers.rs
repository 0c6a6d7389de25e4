//! HTTP Handlers

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use advisor_billing::{BillingError, BillingStatus, ChargeBreakdown, ChargeStatus, UsageSummary};
use portfolio_advisor::{AnalysisResult, Holding, StockInfo, validate_portfolio};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub market_symbols: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Map a usage/billing storage failure: transient ones are 503.
fn storage_error(code: &str, e: &BillingError) -> ApiError {
    let status = if e.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    tracing::error!(error = %e, code, "storage failure");
    api_error(status, code, e.user_message())
}

/// Run file-backed store calls off the async workers
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "blocking task failed");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal error")
    })
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub portfolio: Vec<Holding>,
}

#[derive(Debug, Serialize)]
pub struct BillingSummary {
    pub charged: Decimal,
    pub breakdown: ChargeBreakdown,
    pub billing_session: String,
    pub billing_total: Decimal,
    pub billing_status: ChargeStatus,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub billing: BillingSummary,
    pub usage: UsageSummary,
}

#[derive(Debug, Serialize)]
pub struct MarketStatus {
    pub available: bool,
    pub source: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub cached_records: usize,
    pub last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationsStatus {
    pub market: MarketStatus,
    pub billing: BillingStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "stock-consultant-api",
        version: env!("CARGO_PKG_VERSION"),
        market_symbols: state.market.snapshot().len(),
    })
}

/// Current market snapshot, sorted by symbol
pub async fn get_market(State(state): State<AppState>) -> Json<Vec<StockInfo>> {
    let snapshot = state.market.snapshot();
    Json(snapshot.stocks().into_iter().cloned().collect())
}

/// Analyze a portfolio, record usage and bill for it
pub async fn analyze_portfolio(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let snapshot = state.market.snapshot();
    validate_portfolio(&payload.portfolio, &snapshot).map_err(|e| {
        tracing::warn!(error = %e, "rejected portfolio");
        api_error(StatusCode::UNPROCESSABLE_ENTITY, e.code(), e.to_string())
    })?;

    let analysis = state.advisor.analyze(&payload.portfolio, &snapshot);
    let advice_count = analysis.advice.len();

    let usage_store = Arc::clone(&state.usage);
    let billing = Arc::clone(&state.billing);
    let (usage, session) = blocking(move || {
        let usage = usage_store.record_analysis(advice_count)?;
        Ok::<_, BillingError>((usage, billing.process_full_analysis_billing(advice_count)))
    })
    .await?
    .map_err(|e| storage_error("USAGE_ERROR", &e))?;

    let quote = state.billing.pricing().quote(advice_count);

    tracing::info!(
        holdings = payload.portfolio.len(),
        advice = advice_count,
        portfolio_value = %analysis.portfolio_value,
        session = %session.session_id,
        "portfolio analyzed"
    );

    Ok(Json(AnalyzeResponse {
        analysis,
        billing: BillingSummary {
            charged: quote.charged,
            breakdown: quote.breakdown,
            billing_session: session.session_id,
            billing_total: session.total_amount,
            billing_status: session.status,
        },
        usage,
    }))
}

/// Usage counters
pub async fn get_usage(State(state): State<AppState>) -> Result<Json<UsageSummary>, ApiError> {
    let usage_store = Arc::clone(&state.usage);
    blocking(move || usage_store.summary())
        .await?
        .map(Json)
        .map_err(|e| storage_error("USAGE_ERROR", &e))
}

/// Market feed and billing status
pub async fn integrations_status(
    State(state): State<AppState>,
) -> Result<Json<IntegrationsStatus>, ApiError> {
    let snapshot = state.market.snapshot();

    let billing = state
        .billing
        .status()
        .map_err(|e| storage_error("BILLING_ERROR", &e))?;

    Ok(Json(IntegrationsStatus {
        market: MarketStatus {
            available: state.market_source.is_available().await,
            source: state.market_source.name().to_owned(),
            last_updated: snapshot.loaded_at(),
            cached_records: snapshot.len(),
            last_error: state.market.last_error(),
        },
        billing,
    }))
}
