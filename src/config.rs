use std::path::PathBuf;

use anyhow::Context;
use rust_decimal::Decimal;

use crate::seed::DEFAULT_BASE_FEE;

const DEFAULT_DATABASE_URL: &str = "sqlite://dashboard.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub base_fee: Decimal,
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DASHBOARD_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let base_fee = match lookup("DASHBOARD_BASE_FEE") {
            Some(raw) => raw
                .trim()
                .parse::<Decimal>()
                .with_context(|| format!("DASHBOARD_BASE_FEE must be an amount, got '{raw}'"))?,
            None => Decimal::from(DEFAULT_BASE_FEE),
        };
        anyhow::ensure!(
            base_fee >= Decimal::ZERO,
            "DASHBOARD_BASE_FEE must not be negative"
        );

        let export_dir = lookup("DASHBOARD_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            database_url,
            base_fee,
            export_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).expect("config");
        assert_eq!(config.database_url, "sqlite://dashboard.db");
        assert_eq!(config.base_fee, Decimal::from(50_000));
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn malformed_fee_is_an_error() {
        assert!(config(&[("DASHBOARD_BASE_FEE", "lots")]).is_err());
        assert!(config(&[("DASHBOARD_BASE_FEE", "-10")]).is_err());
        let config = config(&[("DASHBOARD_BASE_FEE", "60000.50")]).expect("config");
        assert_eq!(config.base_fee.to_string(), "60000.50");
    }
}
