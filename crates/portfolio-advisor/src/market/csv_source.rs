//! CSV Market Source
//!
//! Reads a quotes file with a header row. Required columns are
//! `symbol, sector, price, change_7d_pct, volatility`; `name`,
//! `change_1d_pct` and `market_cap_cr` are picked up when present.
//! Any other column is ignored.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::MarketDataSource;
use crate::error::Result;
use crate::model::StockInfo;

/// Parse quotes from CSV text.
///
/// A row with a missing or non-numeric required field fails the whole
/// parse rather than being skipped.
pub fn parse_stocks_csv(reader: impl Read) -> Result<Vec<StockInfo>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut stocks = Vec::new();
    for row in reader.deserialize::<StockInfo>() {
        stocks.push(row?);
    }
    Ok(stocks)
}

/// Market data loaded from a CSV file on every refresh
pub struct CsvMarketSource {
    path: PathBuf,
    label: String,
}

impl CsvMarketSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MarketDataSource for CsvMarketSource {
    async fn load(&self) -> Result<Vec<StockInfo>> {
        tracing::debug!(path = %self.label, "reading market csv");
        let bytes = tokio::fs::read(&self.path).await?;
        parse_stocks_csv(bytes.as_slice())
    }

    async fn is_available(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
