//! Usage Counters
//!
//! Two running totals: how many portfolios were analyzed and how many
//! advice items were produced across all of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::error::{BillingError, Result};

/// Accumulated usage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub portfolios_analyzed_total: u64,
    pub advice_generated_total: u64,
}

impl UsageSummary {
    fn record(&mut self, advice_count: usize) {
        self.portfolios_analyzed_total += 1;
        self.advice_generated_total += advice_count as u64;
    }
}

/// Usage storage trait
pub trait UsageStore: Send + Sync {
    /// Count one analysis that produced `advice_count` items
    fn record_analysis(&self, advice_count: usize) -> Result<UsageSummary>;

    /// Current totals
    fn summary(&self) -> Result<UsageSummary>;
}

/// In-memory usage store (for development and tests)
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    totals: RwLock<UsageSummary>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for MemoryUsageStore {
    fn record_analysis(&self, advice_count: usize) -> Result<UsageSummary> {
        let mut totals = self
            .totals
            .write()
            .map_err(|_| BillingError::Storage("usage lock poisoned".into()))?;
        totals.record(advice_count);
        Ok(*totals)
    }

    fn summary(&self) -> Result<UsageSummary> {
        let totals = self
            .totals
            .read()
            .map_err(|_| BillingError::Storage("usage lock poisoned".into()))?;
        Ok(*totals)
    }
}

/// Usage counters persisted as a small JSON document.
///
/// A missing or unreadable file counts as zero usage; the next write
/// replaces it.
#[derive(Debug)]
pub struct JsonFileUsageStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> UsageSummary {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return UsageSummary::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "usage file unreadable, starting from zero");
                return UsageSummary::default();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "usage file corrupt, starting from zero");
            UsageSummary::default()
        })
    }

    fn save(&self, summary: &UsageSummary) -> Result<()> {
        let json = serde_json::to_vec_pretty(summary)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl UsageStore for JsonFileUsageStore {
    fn record_analysis(&self, advice_count: usize) -> Result<UsageSummary> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| BillingError::Storage("usage file lock poisoned".into()))?;

        let mut summary = self.load();
        summary.record(advice_count);
        self.save(&summary)?;

        tracing::debug!(
            portfolios = summary.portfolios_analyzed_total,
            advice = summary.advice_generated_total,
            "usage recorded"
        );
        Ok(summary)
    }

    fn summary(&self) -> Result<UsageSummary> {
        Ok(self.load())
    }
}
