//! Server Configuration
//!
//! Everything comes from environment variables (optionally via `.env`).
//! Unset variables fall back to defaults; set-but-unparseable ones are
//! a startup error.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use portfolio_advisor::{AdviceThresholds, AdvisorError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Thresholds(#[from] AdvisorError),
}

/// Where market quotes come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarketSourceKind {
    /// CSV file re-read on every refresh
    Csv(PathBuf),
    /// Built-in demo quotes
    Demo,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub market_source: MarketSourceKind,
    pub refresh_interval: Duration,
    pub usage_file: PathBuf,
    pub billing_file: PathBuf,
    pub billing_api_key: Option<String>,
    /// `None` allows any origin
    pub cors_allow_origin: Option<String>,
    pub thresholds: AdviceThresholds,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let market_source = match get("MARKET_SOURCE").as_deref().map(str::trim) {
            None | Some("csv") => MarketSourceKind::Csv(
                get("MARKET_CSV_PATH").map_or_else(|| PathBuf::from("data/stocks.csv"), PathBuf::from),
            ),
            Some("demo") => MarketSourceKind::Demo,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "MARKET_SOURCE",
                    value: other.to_owned(),
                    reason: "expected \"csv\" or \"demo\"".into(),
                });
            }
        };

        let refresh_secs: u64 = parse_or(&get, "MARKET_REFRESH_SECS", 30)?;
        if refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "MARKET_REFRESH_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let defaults = AdviceThresholds::default();
        let thresholds = AdviceThresholds {
            concentration_limit: parse_or(&get, "ADVISOR_CONCENTRATION_LIMIT", defaults.concentration_limit)?,
            sharp_drop_pct: parse_or(&get, "ADVISOR_SHARP_DROP_PCT", defaults.sharp_drop_pct)?,
            strong_growth_pct: parse_or(&get, "ADVISOR_STRONG_GROWTH_PCT", defaults.strong_growth_pct)?,
            high_volatility: parse_or(&get, "ADVISOR_HIGH_VOLATILITY", defaults.high_volatility)?,
            underweight_limit: parse_or(&get, "ADVISOR_UNDERWEIGHT_LIMIT", defaults.underweight_limit)?,
            momentum_pct: parse_or(&get, "ADVISOR_MOMENTUM_PCT", defaults.momentum_pct)?,
            min_sectors: parse_or(&get, "ADVISOR_MIN_SECTORS", defaults.min_sectors)?,
            diversify_empty_portfolio: parse_or(
                &get,
                "ADVISOR_DIVERSIFY_EMPTY",
                defaults.diversify_empty_portfolio,
            )?,
        };
        thresholds.validate()?;

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            market_source,
            refresh_interval: Duration::from_secs(refresh_secs),
            usage_file: get("USAGE_FILE").map_or_else(|| PathBuf::from("usage.json"), PathBuf::from),
            billing_file: get("BILLING_FILE").map_or_else(|| PathBuf::from("billing.jsonl"), PathBuf::from),
            billing_api_key: get("BILLING_API_KEY"),
            cors_allow_origin: get("CORS_ALLOW_ORIGIN"),
            thresholds,
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.market_source, MarketSourceKind::Csv(PathBuf::from("data/stocks.csv")));
        assert_eq!(cfg.refresh_interval, Duration::from_secs(30));
        assert_eq!(cfg.usage_file, PathBuf::from("usage.json"));
        assert!(cfg.cors_allow_origin.is_none());
        assert_eq!(cfg.thresholds, AdviceThresholds::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("MARKET_SOURCE", "demo"),
            ("MARKET_REFRESH_SECS", "5"),
            ("ADVISOR_CONCENTRATION_LIMIT", "0.4"),
            ("ADVISOR_MIN_SECTORS", "3"),
            ("ADVISOR_DIVERSIFY_EMPTY", "false"),
            ("CORS_ALLOW_ORIGIN", "http://localhost:5173"),
        ])
        .unwrap();

        assert_eq!(cfg.market_source, MarketSourceKind::Demo);
        assert_eq!(cfg.refresh_interval, Duration::from_secs(5));
        assert_eq!(cfg.thresholds.concentration_limit, dec!(0.4));
        assert_eq!(cfg.thresholds.min_sectors, 3);
        assert!(!cfg.thresholds.diversify_empty_portfolio);
        assert_eq!(cfg.cors_allow_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let cfg = config(&[("BIND_ADDR", "  "), ("MARKET_REFRESH_SECS", "")]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.refresh_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("MARKET_REFRESH_SECS", "soon")]),
            Err(ConfigError::Invalid { key: "MARKET_REFRESH_SECS", .. })
        ));
        assert!(config(&[("MARKET_REFRESH_SECS", "0")]).is_err());
        assert!(config(&[("MARKET_SOURCE", "kafka")]).is_err());
        assert!(matches!(
            config(&[("ADVISOR_CONCENTRATION_LIMIT", "2")]),
            Err(ConfigError::Thresholds(_))
        ));
    }
}
