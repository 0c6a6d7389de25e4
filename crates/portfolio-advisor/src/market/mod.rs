//! Market Data
//!
//! Read-only snapshots of quotes keyed by symbol, the cache that swaps
//! them atomically, and the sources that produce them.

mod csv_source;
mod fixed;

pub use csv_source::{CsvMarketSource, parse_stocks_csv};
pub use fixed::StaticMarketSource;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::StockInfo;

/// Market data source trait (Strategy pattern)
///
/// Implement this for each feed: CSV export, broker API, streaming pipeline, etc.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Load every quote the source currently has
    async fn load(&self) -> Result<Vec<StockInfo>>;

    /// Check if the source can be read right now
    async fn is_available(&self) -> bool;

    /// Human-readable description (file path, URL, ...)
    fn name(&self) -> &str;
}

/// Immutable point-in-time view of the market
#[derive(Clone, Debug, Default)]
pub struct MarketSnapshot {
    stocks: HashMap<String, StockInfo>,
    source: String,
    loaded_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Snapshot with no quotes (before the first successful load)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot, validating every entry first.
    ///
    /// Fails on the first malformed quote; nothing partial is returned.
    /// When a symbol repeats, the first occurrence is kept.
    pub fn from_stocks(source: impl Into<String>, stocks: Vec<StockInfo>) -> Result<Self> {
        for stock in &stocks {
            stock.validate()?;
        }

        let mut by_symbol = HashMap::with_capacity(stocks.len());
        for stock in stocks {
            if by_symbol.contains_key(&stock.symbol) {
                tracing::debug!(symbol = %stock.symbol, "duplicate quote ignored");
                continue;
            }
            by_symbol.insert(stock.symbol.clone(), stock);
        }

        Ok(Self {
            stocks: by_symbol,
            source: source.into(),
            loaded_at: Some(Utc::now()),
        })
    }

    pub fn get(&self, symbol: &str) -> Option<&StockInfo> {
        self.stocks.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// All quotes, sorted by symbol
    pub fn stocks(&self) -> Vec<&StockInfo> {
        let mut stocks: Vec<_> = self.stocks.values().collect();
        stocks.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        stocks
    }
}

/// Holds the latest snapshot and swaps it atomically on refresh.
///
/// Readers get an `Arc` to a complete snapshot and keep it for as long as
/// they need; a concurrent refresh never mutates what they are holding.
#[derive(Debug, Default)]
pub struct MarketCache {
    current: RwLock<Arc<MarketSnapshot>>,
    last_error: RwLock<Option<String>>,
}

impl MarketCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: MarketSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            last_error: RwLock::new(None),
        }
    }

    /// The latest successfully loaded snapshot
    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    pub fn replace(&self, snapshot: MarketSnapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Error from the most recent failed refresh, cleared on success
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load from `source` and swap in the result.
    ///
    /// On failure the previous snapshot stays live and the error is
    /// both recorded and returned. Returns the number of quotes loaded.
    pub async fn refresh(&self, source: &dyn MarketDataSource) -> Result<usize> {
        let loaded = source
            .load()
            .await
            .and_then(|stocks| MarketSnapshot::from_stocks(source.name(), stocks));

        match loaded {
            Ok(snapshot) => {
                let count = snapshot.len();
                self.replace(snapshot);
                tracing::info!(source = source.name(), stocks = count, "market data refreshed");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(source = source.name(), error = %e, "failed to refresh market data");
                *self.last_error.write().unwrap_or_else(PoisonError::into_inner) = Some(e.to_string());
                Err(e)
            }
        }
    }
}
