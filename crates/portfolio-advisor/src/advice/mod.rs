//! Advisor Engine
//!
//! Turns a portfolio and a market snapshot into a valuation and a list of
//! rule-based recommendations. Pure and deterministic: no I/O, no clock,
//! no randomness, and the same inputs always produce the same advice in
//! the same order.
//!
//! ## Rules (evaluated per holding, in portfolio order)
//!
//! | # | Condition                           | Action        |
//! |---|-------------------------------------|---------------|
//! | 1 | weight > 0.5                        | `reduce`      |
//! | 2 | 7-day change < -5%                  | `reduce`      |
//! | 3 | 7-day change > +5%                  | `hold_or_buy` |
//! | 4 | volatility > 0.04                   | `caution` *   |
//! | 5 | weight < 0.05 and 7-day change > 2% | `buy`         |
//!
//! \* The volatility warning is appended to the first advice item already
//! present for that symbol; a standalone `caution` item is only created
//! when there is none.
//!
//! After all holdings: fewer than two distinct sectors adds a single
//! `PORTFOLIO` / `diversify` item.

mod book;

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::{AdvisorError, Result};
use crate::market::MarketSnapshot;
use crate::model::{
    AdviceAction, AnalysisDetails, AnalysisResult, Holding, HoldingDetail, PORTFOLIO_SYMBOL,
};
use crate::thresholds::AdviceThresholds;

use book::AdviceBook;

pub const CONCENTRATED_MESSAGE: &str = "Too concentrated — consider reducing this holding.";
pub const SHARP_DROP_MESSAGE: &str = "Recent sharp drop — consider reducing or reviewing reason.";
pub const STRONG_GROWTH_MESSAGE: &str =
    "Strong recent growth — consider holding or adding if underweight.";
pub const HIGH_VOLATILITY_MESSAGE: &str = "High volatility — this is risky for beginners.";
pub const UNDERWEIGHT_MOMENTUM_MESSAGE: &str =
    "Underweight and positive momentum — consider adding a small position.";
pub const DIVERSIFY_MESSAGE: &str = "Your portfolio lacks diversification; consider adding stocks from other sectors (e.g., Pharma or Banking).";

/// Rule-based portfolio advisor
#[derive(Clone, Debug, Default)]
pub struct Advisor {
    thresholds: AdviceThresholds,
}

impl Advisor {
    pub const fn new(thresholds: AdviceThresholds) -> Self {
        Self { thresholds }
    }

    pub const fn thresholds(&self) -> &AdviceThresholds {
        &self.thresholds
    }

    /// Value the portfolio and generate advice.
    ///
    /// Holdings whose symbol is missing from `snapshot` are skipped
    /// entirely: no value, no detail row, no advice.
    pub fn analyze(&self, portfolio: &[Holding], snapshot: &MarketSnapshot) -> AnalysisResult {
        let mut per_stock = Vec::with_capacity(portfolio.len());
        let mut sectors = HashSet::new();
        let mut portfolio_value = Decimal::ZERO;

        for holding in portfolio {
            let Some(stock) = snapshot.get(&holding.symbol) else {
                tracing::debug!(symbol = %holding.symbol, "holding not in market snapshot, skipped");
                continue;
            };

            let detail = HoldingDetail::resolve(holding, stock);
            portfolio_value = portfolio_value.saturating_add(detail.stock_value);
            sectors.insert(stock.sector.as_str());
            per_stock.push(detail);
        }

        let mut book = AdviceBook::new();
        for detail in &mut per_stock {
            detail.weight = if portfolio_value > Decimal::ZERO {
                detail
                    .stock_value
                    .checked_div(portfolio_value)
                    .unwrap_or(Decimal::ZERO)
            } else {
                Decimal::ZERO
            };
            self.evaluate_holding(detail, &mut book);
        }

        if self.thresholds.lacks_diversification(sectors.len()) {
            book.push(PORTFOLIO_SYMBOL, AdviceAction::Diversify, DIVERSIFY_MESSAGE);
        }

        let advice = book.into_items();

        tracing::debug!(
            holdings = portfolio.len(),
            resolved = per_stock.len(),
            sectors = sectors.len(),
            advice = advice.len(),
            %portfolio_value,
            "portfolio analyzed"
        );

        AnalysisResult {
            advice,
            portfolio_value,
            details: AnalysisDetails { per_stock },
        }
    }

    fn evaluate_holding(&self, detail: &HoldingDetail, book: &mut AdviceBook) {
        let t = &self.thresholds;
        let symbol = detail.symbol.as_str();

        if t.is_concentrated(detail.weight) {
            book.push(symbol, AdviceAction::Reduce, CONCENTRATED_MESSAGE);
        }

        if t.is_sharp_drop(detail.change_7d_pct) {
            book.push(symbol, AdviceAction::Reduce, SHARP_DROP_MESSAGE);
        }

        if t.is_strong_growth(detail.change_7d_pct) {
            book.push(symbol, AdviceAction::HoldOrBuy, STRONG_GROWTH_MESSAGE);
        }

        if t.is_high_volatility(detail.volatility) {
            book.annotate_or_push(symbol, AdviceAction::Caution, HIGH_VOLATILITY_MESSAGE);
        }

        if t.is_underweight_with_momentum(detail.weight, detail.change_7d_pct) {
            book.push(symbol, AdviceAction::Buy, UNDERWEIGHT_MOMENTUM_MESSAGE);
        }
    }
}

/// Check a request before analysis.
///
/// Validates each holding and fails fast on the first one whose market
/// value, or whose addition to the running portfolio value, cannot be
/// represented exactly. Holdings missing from `snapshot` are only
/// checked in isolation.
pub fn validate_portfolio(portfolio: &[Holding], snapshot: &MarketSnapshot) -> Result<()> {
    let mut total = Decimal::ZERO;

    for holding in portfolio {
        holding.validate()?;
        let Some(stock) = snapshot.get(&holding.symbol) else {
            continue;
        };

        total = stock
            .price
            .checked_mul(holding.quantity)
            .and_then(|value| total.checked_add(value))
            .ok_or_else(|| {
                AdvisorError::InvalidHolding(format!(
                    "{}: quantity {} is too large to value",
                    holding.symbol, holding.quantity
                ))
            })?;
    }

    Ok(())
}

/// Analyze with the default thresholds
pub fn analyze(portfolio: &[Holding], snapshot: &MarketSnapshot) -> AnalysisResult {
    Advisor::default().analyze(portfolio, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StockInfo;
    use rust_decimal_macros::dec;

    fn snapshot(stocks: Vec<StockInfo>) -> MarketSnapshot {
        MarketSnapshot::from_stocks("test", stocks).unwrap()
    }

    fn stock(symbol: &str, sector: &str, price: Decimal, change_7d: Decimal, vol: Decimal) -> StockInfo {
        StockInfo::new(symbol, sector, price, change_7d, vol)
    }

    #[test]
    fn test_volatility_annotates_reduce_from_same_holding() {
        // Concentrated, falling and volatile: one reduce item carries the warning.
        let market = snapshot(vec![
            stock("SUN", "Pharma", dec!(900), dec!(-7), dec!(0.05)),
            stock("HDB", "Banking", dec!(10), dec!(0), dec!(0.01)),
        ]);
        let portfolio = vec![Holding::new("SUN", dec!(10)), Holding::new("HDB", dec!(10))];

        let result = analyze(&portfolio, &market);
        let sun: Vec<_> = result.advice_for("SUN").collect();

        assert_eq!(sun.len(), 2);
        assert_eq!(sun[0].action, AdviceAction::Reduce);
        assert_eq!(
            sun[0].message,
            format!("{CONCENTRATED_MESSAGE} {HIGH_VOLATILITY_MESSAGE}")
        );
        assert_eq!(sun[1].message, SHARP_DROP_MESSAGE);
        assert!(result.advice.iter().all(|a| a.action != AdviceAction::Caution));
    }

    #[test]
    fn test_volatility_without_prior_advice_creates_caution() {
        let market = snapshot(vec![
            stock("A", "IT", dec!(100), dec!(0), dec!(0.06)),
            stock("B", "Energy", dec!(100), dec!(0), dec!(0.01)),
        ]);
        let portfolio = vec![Holding::new("A", dec!(1)), Holding::new("B", dec!(1))];

        let result = analyze(&portfolio, &market);

        assert_eq!(result.advice.len(), 1);
        assert_eq!(result.advice[0].symbol, "A");
        assert_eq!(result.advice[0].action, AdviceAction::Caution);
        assert_eq!(result.advice[0].message, HIGH_VOLATILITY_MESSAGE);
    }

    #[test]
    fn test_buy_rule_fires_after_caution() {
        // Underweight, rising and volatile: caution first, then buy.
        let market = snapshot(vec![
            stock("BIG", "IT", dec!(1000), dec!(0), dec!(0.01)),
            stock("SMALL", "Energy", dec!(10), dec!(3), dec!(0.05)),
        ]);
        let portfolio = vec![Holding::new("BIG", dec!(100)), Holding::new("SMALL", dec!(1))];

        let result = analyze(&portfolio, &market);
        let small: Vec<_> = result.advice_for("SMALL").map(|a| a.action).collect();

        assert_eq!(small, vec![AdviceAction::Caution, AdviceAction::Buy]);
    }

    #[test]
    fn test_repeated_symbol_annotates_earliest_item() {
        let market = snapshot(vec![
            stock("X", "IT", dec!(100), dec!(8), dec!(0.05)),
            stock("Y", "Energy", dec!(100), dec!(0), dec!(0.01)),
        ]);
        let portfolio = vec![
            Holding::new("X", dec!(1)),
            Holding::new("Y", dec!(1)),
            Holding::new("X", dec!(1)),
        ];

        let result = analyze(&portfolio, &market);
        let x: Vec<_> = result.advice_for("X").collect();

        // Each X holding yields hold_or_buy; both warnings land on the first one.
        assert_eq!(x.len(), 2);
        assert_eq!(
            x[0].message,
            format!("{STRONG_GROWTH_MESSAGE} {HIGH_VOLATILITY_MESSAGE} {HIGH_VOLATILITY_MESSAGE}")
        );
        assert_eq!(x[1].message, STRONG_GROWTH_MESSAGE);
        assert_eq!(result.per_stock().len(), 3);
    }

    #[test]
    fn test_zero_value_portfolio_has_zero_weights() {
        let market = snapshot(vec![
            stock("A", "IT", dec!(100), dec!(3), dec!(0.01)),
            stock("B", "Energy", dec!(0), dec!(0), dec!(0.01)),
        ]);
        let portfolio = vec![Holding::new("A", dec!(0)), Holding::new("B", dec!(10))];

        let result = analyze(&portfolio, &market);

        assert_eq!(result.portfolio_value, Decimal::ZERO);
        assert!(result.per_stock().iter().all(|d| d.weight == Decimal::ZERO));
        // Zero weight is underweight, so momentum still suggests a buy.
        let a: Vec<_> = result.advice_for("A").map(|a| a.action).collect();
        assert_eq!(a, vec![AdviceAction::Buy]);
    }

    fn huge_quantity() -> Decimal {
        Decimal::from_i128_with_scale(10_i128.pow(26), 0)
    }

    #[test]
    fn test_unrepresentable_value_does_not_panic() {
        let market = snapshot(vec![
            stock("TCS", "IT", dec!(3300), dec!(0), dec!(0.01)),
            stock("INFY", "IT", dec!(1700), dec!(0), dec!(0.01)),
        ]);
        let portfolio = vec![Holding::new("TCS", huge_quantity()), Holding::new("INFY", dec!(1))];

        let result = analyze(&portfolio, &market);

        assert_eq!(result.portfolio_value, Decimal::MAX);
        assert_eq!(result.per_stock()[0].stock_value, Decimal::MAX);
        assert_eq!(result.advice[0].action, AdviceAction::Reduce);
    }

    #[test]
    fn test_validate_portfolio_rejects_overflowing_value() {
        let market = snapshot(vec![stock("TCS", "IT", dec!(3300), dec!(0), dec!(0.01))]);

        let err = validate_portfolio(&[Holding::new("TCS", huge_quantity())], &market).unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidHolding(_)));
        assert_eq!(err.code(), "INVALID_HOLDING");

        // Each value fits on its own but the running total does not.
        let half = Decimal::MAX / dec!(2) / dec!(3300);
        let portfolio = vec![
            Holding::new("TCS", half.trunc()),
            Holding::new("TCS", half.trunc()),
            Holding::new("TCS", half.trunc()),
        ];
        assert!(validate_portfolio(&portfolio[..1], &market).is_ok());
        assert!(validate_portfolio(&portfolio, &market).is_err());
    }

    #[test]
    fn test_validate_portfolio_accepts_unknown_symbols() {
        let market = snapshot(vec![stock("TCS", "IT", dec!(3300), dec!(0), dec!(0.01))]);
        let portfolio = vec![Holding::new("TCS", dec!(30)), Holding::new("NOPE", huge_quantity())];

        assert!(validate_portfolio(&portfolio, &market).is_ok());
        assert!(validate_portfolio(&[Holding::new("TCS", dec!(-1))], &market).is_err());
    }

    #[test]
    fn test_custom_thresholds() {
        let market = snapshot(vec![
            stock("A", "IT", dec!(100), dec!(0), dec!(0.01)),
            stock("B", "IT", dec!(100), dec!(0), dec!(0.01)),
        ]);
        let portfolio = vec![Holding::new("A", dec!(3)), Holding::new("B", dec!(1))];

        let strict = Advisor::new(AdviceThresholds {
            concentration_limit: dec!(0.8),
            min_sectors: 1,
            ..AdviceThresholds::default()
        });
        let result = strict.analyze(&portfolio, &market);
        assert!(result.advice.is_empty());

        let result = analyze(&portfolio, &market);
        let actions: Vec<_> = result.advice.iter().map(|a| (a.symbol.as_str(), a.action)).collect();
        assert_eq!(
            actions,
            vec![("A", AdviceAction::Reduce), (PORTFOLIO_SYMBOL, AdviceAction::Diversify)]
        );
    }
}
