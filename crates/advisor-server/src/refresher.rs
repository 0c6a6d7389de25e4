//! Background Market Refresher
//!
//! Reloads the market snapshot on a fixed interval. A failed reload is
//! logged and the previous snapshot keeps serving requests.

use std::sync::Arc;
use std::time::Duration;

use portfolio_advisor::{MarketCache, MarketDataSource};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Start refreshing `cache` from `source` every `every`.
///
/// The first reload happens one interval from now; callers do the
/// initial load themselves.
pub fn spawn(
    cache: Arc<MarketCache>,
    source: Arc<dyn MarketDataSource>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(source = source.name(), interval_secs = every.as_secs(), "market refresher started");

        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if cache.refresh(source.as_ref()).await.is_err() {
                tracing::warn!(
                    stocks = cache.snapshot().len(),
                    "keeping previous market snapshot"
                );
            }
        }
    })
}
