//! # advisor-billing
//!
//! Usage tracking and mock pay-per-use billing for the portfolio advisor.
//!
//! Every analysis is recorded twice: once in the usage counters
//! (portfolios analyzed, advice items produced) and once as a billing
//! session in the ledger.
//!
//! ```text
//! ┌──────────────┐  advice_count  ┌──────────────┐
//! │   Advisor    │───────────────▶│  UsageStore  │  portfolios / advice totals
//! │   analyze()  │                └──────────────┘
//! └──────────────┘  advice_count  ┌──────────────┐
//!                  ──────────────▶│BillingClient │  ₹5 base + ₹2 per advice item
//!                                 └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use advisor_billing::{BillingClient, JsonFileUsageStore, PricingConfig, UsageStore};
//!
//! let usage = JsonFileUsageStore::new("usage.json");
//! let billing = BillingClient::new(None, PricingConfig::default());
//!
//! usage.record_analysis(advice.len())?;
//! let session = billing.process_full_analysis_billing(advice.len());
//! ```

mod error;
mod ledger;
mod pricing;
mod usage;

pub use error::{BillingError, Result};
pub use ledger::{
    BillingClient, BillingItem, BillingRecord, BillingSession, BillingStatus, BillingUsage,
    ChargeStatus, LineItem, SessionBreakdown,
};
pub use pricing::{ChargeBreakdown, ChargeQuote, PricingConfig};
pub use usage::{JsonFileUsageStore, MemoryUsageStore, UsageStore, UsageSummary};
