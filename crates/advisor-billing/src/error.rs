//! Billing Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, BillingError>;

/// Usage and billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// Reading or writing a counter/ledger file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Counter/ledger file could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// In-process storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BillingError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Storage(_))
    }

    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Storage(_) => "Storage is temporarily unavailable. Please try again.",
            Self::Serialization(_) => "Stored records are unreadable.",
        }
    }
}
