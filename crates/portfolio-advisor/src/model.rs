//! Domain Models
//!
//! Core data types for stock portfolio analysis.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Symbol used for advice that applies to the portfolio as a whole
pub const PORTFOLIO_SYMBOL: &str = "PORTFOLIO";

/// A position supplied by the caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol (e.g., "TCS", "INFY")
    pub symbol: String,

    /// Number of shares held (fractional quantities are allowed)
    pub quantity: Decimal,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }

    /// Reject holdings the engine should never see.
    ///
    /// The engine is total over any input, so this is for callers that
    /// want to refuse malformed requests up front.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(AdvisorError::InvalidHolding("symbol must not be empty".into()));
        }
        if self.quantity < Decimal::ZERO {
            return Err(AdvisorError::InvalidHolding(format!(
                "{}: quantity must not be negative (got {})",
                self.symbol, self.quantity
            )));
        }
        Ok(())
    }
}

/// Market data for a single stock
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Ticker symbol
    pub symbol: String,

    /// Company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Sector (e.g., "IT", "Banking")
    pub sector: String,

    /// Last traded price
    pub price: Decimal,

    /// One-day price change percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_1d_pct: Option<Decimal>,

    /// Seven-day price change percentage (signed)
    pub change_7d_pct: Decimal,

    /// Daily volatility as a fraction (0.04 = 4%)
    pub volatility: Decimal,

    /// Market capitalisation in crores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_cr: Option<Decimal>,
}

impl StockInfo {
    pub fn new(
        symbol: impl Into<String>,
        sector: impl Into<String>,
        price: Decimal,
        change_7d_pct: Decimal,
        volatility: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            sector: sector.into(),
            price,
            change_1d_pct: None,
            change_7d_pct,
            volatility,
            market_cap_cr: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check the fields the engine relies on
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| AdvisorError::InvalidStock {
            symbol: self.symbol.clone(),
            reason: reason.into(),
        };

        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol is empty"));
        }
        if self.sector.trim().is_empty() {
            return Err(invalid("sector is empty"));
        }
        if self.price < Decimal::ZERO {
            return Err(invalid("price is negative"));
        }
        if self.volatility < Decimal::ZERO {
            return Err(invalid("volatility is negative"));
        }
        Ok(())
    }
}

/// A holding enriched with market data and its share of the portfolio
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingDetail {
    pub symbol: String,
    pub quantity: Decimal,
    pub price: Decimal,

    /// price × quantity
    pub stock_value: Decimal,

    pub sector: String,
    pub change_7d_pct: Decimal,
    pub volatility: Decimal,

    /// stock_value / portfolio value, or zero when the portfolio is worthless
    pub weight: Decimal,
}

impl HoldingDetail {
    /// Values past `Decimal::MAX` saturate; `validate_portfolio` rejects
    /// such holdings before they reach the engine.
    pub(crate) fn resolve(holding: &Holding, stock: &StockInfo) -> Self {
        Self {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            price: stock.price,
            stock_value: stock.price.saturating_mul(holding.quantity),
            sector: stock.sector.clone(),
            change_7d_pct: stock.change_7d_pct,
            volatility: stock.volatility,
            weight: Decimal::ZERO,
        }
    }
}

/// What the advisor suggests doing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceAction {
    Reduce,
    HoldOrBuy,
    Caution,
    Buy,
    Diversify,
}

impl AdviceAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reduce => "reduce",
            Self::HoldOrBuy => "hold_or_buy",
            Self::Caution => "caution",
            Self::Buy => "buy",
            Self::Diversify => "diversify",
        }
    }
}

impl std::fmt::Display for AdviceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recommendation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceItem {
    /// Stock symbol, or [`PORTFOLIO_SYMBOL`] for portfolio-level advice
    pub symbol: String,

    pub action: AdviceAction,

    /// Human-readable explanation
    pub message: String,
}

impl AdviceItem {
    pub fn new(symbol: impl Into<String>, action: AdviceAction, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            action,
            message: message.into(),
        }
    }

    pub fn is_portfolio_level(&self) -> bool {
        self.symbol == PORTFOLIO_SYMBOL
    }
}

/// Per-holding breakdown of an analysis
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDetails {
    pub per_stock: Vec<HoldingDetail>,
}

/// Output of one advisor run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Recommendations in rule-evaluation order
    pub advice: Vec<AdviceItem>,

    /// Sum of stock values over resolved holdings
    pub portfolio_value: Decimal,

    pub details: AnalysisDetails,
}

impl AnalysisResult {
    pub fn per_stock(&self) -> &[HoldingDetail] {
        &self.details.per_stock
    }

    /// All advice attached to `symbol`
    pub fn advice_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a AdviceItem> + 'a {
        self.advice.iter().filter(move |a| a.symbol == symbol)
    }

    pub fn detail_for(&self, symbol: &str) -> Option<&HoldingDetail> {
        self.details.per_stock.iter().find(|d| d.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_holding_validation() {
        assert!(Holding::new("TCS", dec!(10)).validate().is_ok());
        assert!(Holding::new("TCS", dec!(0)).validate().is_ok());
        assert!(Holding::new("TCS", dec!(0.5)).validate().is_ok());
        assert!(Holding::new("", dec!(1)).validate().is_err());
        assert!(Holding::new("  ", dec!(1)).validate().is_err());
        assert!(Holding::new("TCS", dec!(-1)).validate().is_err());
    }

    #[test]
    fn test_stock_validation() {
        let stock = StockInfo::new("TCS", "IT", dec!(3300), dec!(1.8), dec!(0.015));
        assert!(stock.validate().is_ok());

        let mut bad = stock.clone();
        bad.price = dec!(-1);
        assert!(matches!(bad.validate(), Err(AdvisorError::InvalidStock { .. })));

        let mut bad = stock.clone();
        bad.volatility = dec!(-0.01);
        assert!(bad.validate().is_err());

        let mut bad = stock;
        bad.sector = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_action_serializes_snake_case() {
        let json = serde_json::to_string(&AdviceAction::HoldOrBuy).unwrap();
        assert_eq!(json, "\"hold_or_buy\"");
        assert_eq!(AdviceAction::Diversify.to_string(), "diversify");
    }

    #[test]
    fn test_holding_accepts_json_numbers() {
        let holding: Holding = serde_json::from_str(r#"{"symbol":"TCS","quantity":30}"#).unwrap();
        assert_eq!(holding.quantity, dec!(30));

        let holding: Holding = serde_json::from_str(r#"{"symbol":"TCS","quantity":2.5}"#).unwrap();
        assert_eq!(holding.quantity, dec!(2.5));
    }

    #[test]
    fn test_result_serializes_nested_details() {
        let result = AnalysisResult::default();
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["details"]["per_stock"].as_array().unwrap().is_empty());
        assert!(value["advice"].as_array().unwrap().is_empty());
        assert!(value["portfolio_value"].is_number());
    }
}
