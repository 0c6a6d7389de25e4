//! Application State

use std::sync::Arc;

use advisor_billing::{BillingClient, UsageStore};
use portfolio_advisor::{Advisor, MarketCache, MarketDataSource};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Rule engine with the configured thresholds
    pub advisor: Arc<Advisor>,

    /// Latest market snapshot, swapped by the refresher
    pub market: Arc<MarketCache>,

    /// Where the snapshot comes from (for status reporting)
    pub market_source: Arc<dyn MarketDataSource>,

    /// Analysis / advice counters
    pub usage: Arc<dyn UsageStore>,

    /// Mock pay-per-use billing
    pub billing: Arc<BillingClient>,
}
