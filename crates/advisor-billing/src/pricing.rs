//! Pricing
//!
//! Pay-per-use: a flat fee per portfolio analysis plus a fee for every
//! advice item it produced.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Prices charged per analysis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Flat fee per analyzed portfolio
    pub portfolio_analysis_price: Decimal,

    /// Fee per generated advice item
    pub advice_item_price: Decimal,

    /// ISO currency code
    pub currency: String,

    pub billing_model: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            portfolio_analysis_price: dec!(5),
            advice_item_price: dec!(2),
            currency: "INR".into(),
            billing_model: "pay_per_use".into(),
        }
    }
}

impl PricingConfig {
    /// Cost of advice items alone
    pub fn advice_cost(&self, advice_count: usize) -> Decimal {
        self.advice_item_price * Decimal::from(advice_count)
    }

    /// What one analysis with `advice_count` items costs
    pub fn quote(&self, advice_count: usize) -> ChargeQuote {
        let advice_cost = self.advice_cost(advice_count);
        ChargeQuote {
            charged: self.portfolio_analysis_price + advice_cost,
            breakdown: ChargeBreakdown {
                portfolio_analysis: self.portfolio_analysis_price,
                advice_items: advice_count,
                price_per_advice: self.advice_item_price,
                advice_cost,
            },
        }
    }
}

/// Total charge for one analysis
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeQuote {
    pub charged: Decimal,
    pub breakdown: ChargeBreakdown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    pub portfolio_analysis: Decimal,
    pub advice_items: usize,
    pub price_per_advice: Decimal,
    pub advice_cost: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        let quote = PricingConfig::default().quote(4);
        assert_eq!(quote.charged, dec!(13));
        assert_eq!(quote.breakdown.portfolio_analysis, dec!(5));
        assert_eq!(quote.breakdown.advice_items, 4);
        assert_eq!(quote.breakdown.advice_cost, dec!(8));
    }

    #[test]
    fn test_quote_without_advice() {
        let quote = PricingConfig::default().quote(0);
        assert_eq!(quote.charged, dec!(5));
        assert_eq!(quote.breakdown.advice_cost, Decimal::ZERO);
    }
}
