//! Rule Thresholds
//!
//! Every comparison made by the advisor is strict (`>` / `<`), so a
//! holding sitting exactly on a threshold never triggers the rule.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

/// Tunable limits for the advice rules
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceThresholds {
    /// Weight above which a holding is too concentrated
    pub concentration_limit: Decimal,

    /// 7-day change (percent) below which a drop is "sharp"
    pub sharp_drop_pct: Decimal,

    /// 7-day change (percent) above which growth is "strong"
    pub strong_growth_pct: Decimal,

    /// Volatility above which a stock is risky for beginners
    pub high_volatility: Decimal,

    /// Weight below which a holding counts as underweight
    pub underweight_limit: Decimal,

    /// 7-day change (percent) above which an underweight holding has momentum
    pub momentum_pct: Decimal,

    /// Fewer distinct sectors than this triggers the diversify advice
    pub min_sectors: usize,

    /// Whether a portfolio with no resolved holdings is told to diversify
    pub diversify_empty_portfolio: bool,
}

impl Default for AdviceThresholds {
    fn default() -> Self {
        Self {
            concentration_limit: dec!(0.5),
            sharp_drop_pct: dec!(-5),
            strong_growth_pct: dec!(5),
            high_volatility: dec!(0.04),
            underweight_limit: dec!(0.05),
            momentum_pct: dec!(2),
            min_sectors: 2,
            diversify_empty_portfolio: true,
        }
    }
}

impl AdviceThresholds {
    pub fn validate(&self) -> Result<()> {
        let weight_range = Decimal::ZERO..=Decimal::ONE;

        if !weight_range.contains(&self.concentration_limit) {
            return Err(AdvisorError::InvalidThresholds(format!(
                "concentration_limit must be within [0, 1], got {}",
                self.concentration_limit
            )));
        }
        if !weight_range.contains(&self.underweight_limit) {
            return Err(AdvisorError::InvalidThresholds(format!(
                "underweight_limit must be within [0, 1], got {}",
                self.underweight_limit
            )));
        }
        if self.high_volatility < Decimal::ZERO {
            return Err(AdvisorError::InvalidThresholds(format!(
                "high_volatility must not be negative, got {}",
                self.high_volatility
            )));
        }
        if self.min_sectors == 0 {
            return Err(AdvisorError::InvalidThresholds("min_sectors must be at least 1".into()));
        }
        Ok(())
    }

    pub(crate) fn is_concentrated(&self, weight: Decimal) -> bool {
        weight > self.concentration_limit
    }

    pub(crate) fn is_sharp_drop(&self, change_7d_pct: Decimal) -> bool {
        change_7d_pct < self.sharp_drop_pct
    }

    pub(crate) fn is_strong_growth(&self, change_7d_pct: Decimal) -> bool {
        change_7d_pct > self.strong_growth_pct
    }

    pub(crate) fn is_high_volatility(&self, volatility: Decimal) -> bool {
        volatility > self.high_volatility
    }

    pub(crate) fn is_underweight_with_momentum(&self, weight: Decimal, change_7d_pct: Decimal) -> bool {
        weight < self.underweight_limit && change_7d_pct > self.momentum_pct
    }

    pub(crate) fn lacks_diversification(&self, distinct_sectors: usize) -> bool {
        if distinct_sectors == 0 && !self.diversify_empty_portfolio {
            return false;
        }
        distinct_sectors < self.min_sectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AdviceThresholds::default().validate().is_ok());
    }

    #[test]
    fn test_comparisons_are_strict() {
        let t = AdviceThresholds::default();

        assert!(!t.is_concentrated(dec!(0.5)));
        assert!(t.is_concentrated(dec!(0.5000001)));

        assert!(!t.is_sharp_drop(dec!(-5)));
        assert!(t.is_sharp_drop(dec!(-5.01)));

        assert!(!t.is_strong_growth(dec!(5)));
        assert!(t.is_strong_growth(dec!(5.01)));

        assert!(!t.is_high_volatility(dec!(0.04)));
        assert!(t.is_high_volatility(dec!(0.041)));

        assert!(!t.is_underweight_with_momentum(dec!(0.05), dec!(3)));
        assert!(!t.is_underweight_with_momentum(dec!(0.01), dec!(2)));
        assert!(t.is_underweight_with_momentum(dec!(0.0499), dec!(2.1)));
    }

    #[test]
    fn test_diversification_rule() {
        let t = AdviceThresholds::default();
        assert!(t.lacks_diversification(0));
        assert!(t.lacks_diversification(1));
        assert!(!t.lacks_diversification(2));

        let quiet = AdviceThresholds {
            diversify_empty_portfolio: false,
            ..AdviceThresholds::default()
        };
        assert!(!quiet.lacks_diversification(0));
        assert!(quiet.lacks_diversification(1));
    }

    #[test]
    fn test_invalid_thresholds() {
        let t = AdviceThresholds {
            concentration_limit: dec!(1.5),
            ..AdviceThresholds::default()
        };
        assert!(t.validate().is_err());

        let t = AdviceThresholds {
            min_sectors: 0,
            ..AdviceThresholds::default()
        };
        assert!(t.validate().is_err());

        let t = AdviceThresholds {
            high_volatility: dec!(-0.1),
            ..AdviceThresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let t: AdviceThresholds = serde_json::from_str(r#"{"min_sectors": 3}"#).unwrap();
        assert_eq!(t.min_sectors, 3);
        assert_eq!(t.concentration_limit, dec!(0.5));
    }
}
