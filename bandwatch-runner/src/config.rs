//! Dashboard configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! buy-side dashboard with the stock symbols, capital, and risk budget.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use bandwatch_core::domain::Symbol;
use bandwatch_core::indicators::IndicatorParams;
use bandwatch_core::signals::{ThresholdConfig, Variant};
use bandwatch_core::sizing::RiskConfig;

/// Number of symbol slots on the dashboard form.
pub const SYMBOL_SLOTS: usize = 3;

/// Default refresh cadence for the snapshot scheduler.
pub const DEFAULT_REFRESH_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Partial threshold overrides; unset fields come from the variant preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdOverrides {
    pub buy_rsi_max: Option<f64>,
    pub sell_rsi_min: Option<f64>,
    pub require_below_lower_band_for_buy: Option<bool>,
    pub target_percent: Option<f64>,
    pub size_sell_signals: Option<bool>,
}

impl ThresholdOverrides {
    pub fn apply(&self, base: ThresholdConfig) -> ThresholdConfig {
        ThresholdConfig {
            buy_rsi_max: self.buy_rsi_max.unwrap_or(base.buy_rsi_max),
            sell_rsi_min: self.sell_rsi_min.unwrap_or(base.sell_rsi_min),
            require_below_lower_band_for_buy: self
                .require_below_lower_band_for_buy
                .unwrap_or(base.require_below_lower_band_for_buy),
            target_percent: self.target_percent.unwrap_or(base.target_percent),
            size_sell_signals: self.size_sell_signals.unwrap_or(base.size_sell_signals),
        }
    }
}

/// Serializable dashboard configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub variant: Variant,
    /// Empty means "the variant's default symbols".
    pub symbols: Vec<Symbol>,
    pub risk: RiskConfig,
    pub indicators: IndicatorParams,
    pub thresholds: ThresholdOverrides,
    pub refresh_secs: u64,
    pub snapshot_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            variant: Variant::BuySide,
            symbols: Vec::new(),
            risk: RiskConfig::default(),
            indicators: IndicatorParams::default(),
            thresholds: ThresholdOverrides::default(),
            refresh_secs: DEFAULT_REFRESH_SECS,
            snapshot_path: PathBuf::from("snapshot/index.html"),
        }
    }
}

/// Symbols a fresh dashboard starts with.
pub fn default_symbols(variant: Variant) -> Vec<Symbol> {
    let symbols: [&str; SYMBOL_SLOTS] = match variant {
        Variant::BuySide => ["DIVISLAB.NS", "HDFCBANK.NS", "DRREDDY.NS"],
        Variant::SellSide => ["TATAMOTORS.NS", "MARUTI.NS", "TCS.NS"],
    };
    symbols.iter().map(|s| s.to_string()).collect()
}

impl DashboardConfig {
    /// Load a configuration from a TOML file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolved symbol list (variant defaults when none configured).
    pub fn resolved_symbols(&self) -> Vec<Symbol> {
        if self.symbols.is_empty() {
            default_symbols(self.variant)
        } else {
            self.symbols.clone()
        }
    }

    /// Resolved thresholds (variant preset plus overrides).
    pub fn resolved_thresholds(&self) -> ThresholdConfig {
        self.thresholds.apply(self.variant.thresholds())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.len() > SYMBOL_SLOTS {
            return Err(ConfigError::Invalid(format!(
                "at most {SYMBOL_SLOTS} symbols are supported, got {}",
                self.symbols.len()
            )));
        }
        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("symbols must not be blank".into()));
        }
        self.risk
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let p = &self.indicators;
        if p.rsi_window < 1 {
            return Err(ConfigError::Invalid("indicators.rsi_window must be >= 1".into()));
        }
        if p.bb_window < 2 {
            return Err(ConfigError::Invalid("indicators.bb_window must be >= 2".into()));
        }
        if !p.num_std_dev.is_finite() || p.num_std_dev < 0.0 {
            return Err(ConfigError::Invalid("indicators.num_std_dev must be >= 0".into()));
        }

        let t = self.resolved_thresholds();
        for (name, value) in [
            ("thresholds.buy_rsi_max", t.buy_rsi_max),
            ("thresholds.sell_rsi_min", t.sell_rsi_min),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within 0..=100")));
            }
        }
        if !t.target_percent.is_finite() || t.target_percent < 0.0 {
            return Err(ConfigError::Invalid("thresholds.target_percent must be >= 0".into()));
        }

        if self.refresh_secs == 0 {
            return Err(ConfigError::Invalid("refresh_secs must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_buy_side_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.resolved_symbols(), default_symbols(Variant::BuySide));
        assert_eq!(config.resolved_thresholds(), ThresholdConfig::buy_side());
        assert_eq!(config.indicators.rsi_window, 23);
        assert_eq!(config.refresh_secs, 300);
    }

    #[test]
    fn sell_side_with_overrides() {
        let config = DashboardConfig::from_toml(
            r#"
            variant = "sell_side"
            symbols = ["TCS.NS"]

            [risk]
            capital = 500000.0
            risk_per_trade = 2500.0

            [thresholds]
            sell_rsi_min = 70.0
            "#,
        )
        .unwrap();

        assert_eq!(config.resolved_symbols(), vec!["TCS.NS".to_string()]);
        let t = config.resolved_thresholds();
        assert_eq!(t.sell_rsi_min, 70.0);
        assert_eq!(t.buy_rsi_max, 20.0);
        assert!(t.size_sell_signals);
        assert_eq!(config.risk.capital, 500_000.0);
    }

    #[test]
    fn rejects_non_positive_capital() {
        let err = DashboardConfig::from_toml("[risk]\ncapital = 0.0\nrisk_per_trade = 1.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_too_many_symbols() {
        let err = DashboardConfig::from_toml(r#"symbols = ["A", "B", "C", "D"]"#).unwrap_err();
        assert!(err.to_string().contains("at most 3"));
    }

    #[test]
    fn rejects_degenerate_band_window() {
        let err = DashboardConfig::from_toml("[indicators]\nbb_window = 1\n").unwrap_err();
        assert!(err.to_string().contains("bb_window"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            DashboardConfig::from_toml("colour = \"red\"").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = DashboardConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
