//! Billing Ledger
//!
//! Mock usage-based billing client. Every analysis is charged as two
//! transactions (base fee + advice items) and grouped into a session.
//! Records live in memory and can be mirrored to a JSON Lines file,
//! one record appended per charge.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{BillingError, Result};
use crate::pricing::PricingConfig;

const DEFAULT_API_KEY: &str = "mock_billing_key_12345";

/// What a transaction charged for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingItem {
    PortfolioAnalysis,
    AdviceGeneration,
}

impl BillingItem {
    const fn id_prefix(self) -> &'static str {
        match self {
            Self::PortfolioAnalysis => "flx_portfolio",
            Self::AdviceGeneration => "flx_advice",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeStatus {
    Completed,
    Failed,
}

/// A single billing transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingRecord {
    pub transaction_id: String,
    pub item_type: BillingItem,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    pub amount: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub status: ChargeStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BillingRecord {
    fn failed(item_type: BillingItem, currency: &str, error: impl Into<String>) -> Self {
        Self {
            transaction_id: format!("flx_error_{}", short_id()),
            item_type,
            quantity: None,
            unit_price: None,
            amount: Decimal::ZERO,
            currency: currency.to_owned(),
            timestamp: Utc::now(),
            status: ChargeStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// One line of a session breakdown
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub transaction_id: String,
    pub amount: Decimal,
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionBreakdown {
    pub portfolio_analysis: LineItem,
    pub advice_generation: LineItem,
}

/// Billing for one complete analysis
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingSession {
    pub session_id: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub status: ChargeStatus,
    pub billing_model: String,
    pub breakdown: SessionBreakdown,
}

/// Totals derived from the ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingUsage {
    pub total_sessions: u64,
    pub total_advice_items: u64,
    pub total_revenue: Decimal,
    pub currency: String,
    pub billing_model: String,
    pub last_updated: DateTime<Utc>,
}

/// Connection and pricing overview
#[derive(Clone, Debug, Serialize)]
pub struct BillingStatus {
    pub connected: bool,
    pub api_key_prefix: String,
    pub pricing: PricingConfig,
    pub usage_summary: BillingUsage,
}

/// Mock pay-per-use billing client
pub struct BillingClient {
    api_key: String,
    pricing: PricingConfig,
    records: RwLock<Vec<BillingRecord>>,
    ledger_path: Option<PathBuf>,
}

impl BillingClient {
    pub fn new(api_key: Option<String>, pricing: PricingConfig) -> Self {
        let api_key = api_key.unwrap_or_else(|| DEFAULT_API_KEY.into());
        tracing::info!(api_key_prefix = %key_prefix(&api_key), "billing client initialized");
        Self {
            api_key,
            pricing,
            records: RwLock::new(Vec::new()),
            ledger_path: None,
        }
    }

    /// Mirror the ledger to `path`, loading any records already there
    pub fn with_ledger_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let existing = load_ledger(&path);
        tracing::debug!(path = %path.display(), records = existing.len(), "billing ledger loaded");
        self.records = RwLock::new(existing);
        self.ledger_path = Some(path);
        self
    }

    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn api_key_prefix(&self) -> String {
        key_prefix(&self.api_key)
    }

    /// Flat fee for one portfolio analysis
    pub fn charge_for_portfolio(&self) -> BillingRecord {
        let amount = self.pricing.portfolio_analysis_price;
        let record = self.new_record(BillingItem::PortfolioAnalysis, amount, None, None);
        tracing::info!(%amount, transaction = %record.transaction_id, "portfolio charge");
        self.settle(record)
    }

    /// Per-item fee for generated advice
    pub fn charge_for_advice(&self, advice_count: usize) -> BillingRecord {
        let unit_price = self.pricing.advice_item_price;
        let amount = self.pricing.advice_cost(advice_count);
        let record = self.new_record(
            BillingItem::AdviceGeneration,
            amount,
            Some(advice_count as u64),
            Some(unit_price),
        );
        tracing::info!(
            advice_count,
            %unit_price,
            %amount,
            transaction = %record.transaction_id,
            "advice charge"
        );
        self.settle(record)
    }

    /// Charge both fees for one analysis and group them in a session
    pub fn process_full_analysis_billing(&self, advice_count: usize) -> BillingSession {
        let portfolio = self.charge_for_portfolio();
        let advice = self.charge_for_advice(advice_count);

        let status = if portfolio.status == ChargeStatus::Completed
            && advice.status == ChargeStatus::Completed
        {
            ChargeStatus::Completed
        } else {
            ChargeStatus::Failed
        };

        let session = BillingSession {
            session_id: format!("flx_session_{}", short_id()),
            total_amount: portfolio.amount + advice.amount,
            currency: self.pricing.currency.clone(),
            timestamp: Utc::now(),
            status,
            billing_model: self.pricing.billing_model.clone(),
            breakdown: SessionBreakdown {
                portfolio_analysis: LineItem {
                    transaction_id: portfolio.transaction_id,
                    amount: portfolio.amount,
                    description: "Portfolio analysis base fee".into(),
                    quantity: None,
                    unit_price: None,
                },
                advice_generation: LineItem {
                    transaction_id: advice.transaction_id,
                    amount: advice.amount,
                    description: format!("Generated {advice_count} investment recommendations"),
                    quantity: Some(advice_count as u64),
                    unit_price: advice.unit_price,
                },
            },
        };

        tracing::info!(session = %session.session_id, total = %session.total_amount, "session billed");
        session
    }

    /// Totals over every completed transaction in the ledger
    pub fn usage_summary(&self) -> Result<BillingUsage> {
        let records = self
            .records
            .read()
            .map_err(|_| BillingError::Storage("billing ledger lock poisoned".into()))?;

        let mut usage = BillingUsage {
            total_sessions: 0,
            total_advice_items: 0,
            total_revenue: Decimal::ZERO,
            currency: self.pricing.currency.clone(),
            billing_model: self.pricing.billing_model.clone(),
            last_updated: Utc::now(),
        };

        for record in records.iter().filter(|r| r.status == ChargeStatus::Completed) {
            match record.item_type {
                BillingItem::PortfolioAnalysis => usage.total_sessions += 1,
                BillingItem::AdviceGeneration => {
                    usage.total_advice_items += record.quantity.unwrap_or(0);
                }
            }
            usage.total_revenue += record.amount;
        }

        Ok(usage)
    }

    pub fn status(&self) -> Result<BillingStatus> {
        Ok(BillingStatus {
            connected: true,
            api_key_prefix: self.api_key_prefix(),
            pricing: self.pricing.clone(),
            usage_summary: self.usage_summary()?,
        })
    }

    fn new_record(
        &self,
        item_type: BillingItem,
        amount: Decimal,
        quantity: Option<u64>,
        unit_price: Option<Decimal>,
    ) -> BillingRecord {
        BillingRecord {
            transaction_id: format!("{}_{}", item_type.id_prefix(), short_id()),
            item_type,
            quantity,
            unit_price,
            amount,
            currency: self.pricing.currency.clone(),
            timestamp: Utc::now(),
            status: ChargeStatus::Completed,
            error: None,
        }
    }

    /// Append to the ledger. A ledger that cannot be updated turns the
    /// charge into a failed record; a file that cannot be written is
    /// only logged.
    fn settle(&self, record: BillingRecord) -> BillingRecord {
        let Ok(mut records) = self.records.write() else {
            tracing::error!(transaction = %record.transaction_id, "billing ledger lock poisoned");
            return BillingRecord::failed(record.item_type, &record.currency, "billing ledger unavailable");
        };
        records.push(record.clone());

        if let Some(path) = &self.ledger_path {
            if let Err(e) = append_record(path, &record) {
                tracing::error!(path = %path.display(), error = %e, "failed to save billing record");
            }
        }

        record
    }
}

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_owned()
}

fn key_prefix(key: &str) -> String {
    key.chars().take(10).collect()
}

fn load_ledger(path: &Path) -> Vec<BillingRecord> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "billing ledger unreadable, starting empty");
            return Vec::new();
        }
    };

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping corrupt billing record");
                None
            }
        })
        .collect()
}

fn append_record(path: &Path, record: &BillingRecord) -> Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?
        .write_all(&line)?;
    Ok(())
}
