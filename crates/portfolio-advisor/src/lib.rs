//! # portfolio-advisor
//!
//! Beginner-friendly stock portfolio advisor. Values a set of holdings
//! against a market snapshot and produces rule-based recommendations.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────┐   refresh    ┌──────────────┐  snapshot()  ┌──────────────┐
//! │ MarketDataSource │─────────────▶│ MarketCache  │─────────────▶│   Advisor    │
//! │ (CSV / static)   │  (atomic     │ Arc<Snapshot>│  (immutable) │  analyze()   │
//! └──────────────────┘   swap)      └──────────────┘              └──────┬───────┘
//!                                                                        │
//!                                          advice + portfolio_value + per_stock
//! ```
//!
//! ## Example
//!
//! ```text
//! Portfolio: 30 × TCS @ 3300, 1 × INFY @ 1700
//!
//!   portfolio_value = 100,700
//!   TCS   weight 98.3%  → reduce  "Too concentrated — consider reducing this holding."
//!   INFY  weight  1.7%  → buy     "Underweight and positive momentum — ..."
//!   PORTFOLIO           → diversify (only the IT sector is represented)
//! ```

pub mod advice;
pub mod error;
pub mod market;
pub mod model;
pub mod thresholds;

pub use advice::{Advisor, analyze, validate_portfolio};
pub use error::{AdvisorError, Result};
pub use market::{MarketCache, MarketDataSource, MarketSnapshot};
pub use model::{
    AdviceAction, AdviceItem, AnalysisDetails, AnalysisResult, Holding, HoldingDetail,
    PORTFOLIO_SYMBOL, StockInfo,
};
pub use thresholds::AdviceThresholds;
