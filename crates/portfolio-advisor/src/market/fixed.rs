//! Static Market Source
//!
//! For testing and demo purposes. Returns a fixed set of quotes.

use async_trait::async_trait;
use rust_decimal_macros::dec;

use super::MarketDataSource;
use crate::error::Result;
use crate::model::StockInfo;

/// Market source backed by an in-memory list
pub struct StaticMarketSource {
    stocks: Vec<StockInfo>,
}

impl StaticMarketSource {
    pub const fn new(stocks: Vec<StockInfo>) -> Self {
        Self { stocks }
    }

    /// Five NSE large caps across four sectors
    pub fn demo() -> Self {
        let quote = |symbol: &str, name: &str, sector: &str, price, change_1d, change_7d, volatility, cap| StockInfo {
            change_1d_pct: Some(change_1d),
            market_cap_cr: Some(cap),
            ..StockInfo::new(symbol, sector, price, change_7d, volatility).with_name(name)
        };

        Self::new(vec![
            quote("TCS", "Tata Consultancy Services", "IT", dec!(3300), dec!(0.4), dec!(1.8), dec!(0.015), dec!(125000)),
            quote("INFY", "Infosys", "IT", dec!(1700), dec!(-0.6), dec!(2.4), dec!(0.020), dec!(76000)),
            quote("RELIANCE", "Reliance Industries", "Energy", dec!(2600), dec!(1.2), dec!(6.0), dec!(0.035), dec!(160000)),
            quote("SUNPHARMA", "Sun Pharmaceutical", "Pharma", dec!(900), dec!(-2.5), dec!(-7.0), dec!(0.050), dec!(18000)),
            quote("HDFCBANK", "HDFC Bank", "Banking", dec!(1500), dec!(0.2), dec!(3.5), dec!(0.012), dec!(90000)),
        ])
    }
}

#[async_trait]
impl MarketDataSource for StaticMarketSource {
    async fn load(&self) -> Result<Vec<StockInfo>> {
        Ok(self.stocks.clone())
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_quotes_are_valid() {
        let stocks = StaticMarketSource::demo().load().await.unwrap();
        assert_eq!(stocks.len(), 5);
        assert!(stocks.iter().all(|s| s.validate().is_ok()));

        let sunpharma = stocks.iter().find(|s| s.symbol == "SUNPHARMA").unwrap();
        assert_eq!(sunpharma.change_7d_pct, dec!(-7));
        assert_eq!(sunpharma.volatility, dec!(0.05));
    }
}
