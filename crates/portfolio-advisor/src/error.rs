//! Error Types for the Portfolio Advisor
//!
//! The engine itself never fails; these errors come from validating
//! inputs at the edges and from loading market data.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Invalid holding: {0}")]
    InvalidHolding(String),

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidStock { symbol: String, reason: String },

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AdvisorError {
    /// Short machine-readable code, used by the HTTP layer.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidHolding(_) => "INVALID_HOLDING",
            Self::InvalidStock { .. } => "INVALID_MARKET_DATA",
            Self::InvalidThresholds(_) => "INVALID_THRESHOLDS",
            Self::MarketDataUnavailable(_) | Self::Io(_) | Self::Csv(_) => "MARKET_DATA_UNAVAILABLE",
        }
    }
}
