//! Signal types and threshold configuration.
//!
//! A signal is a per-bar classification. It never depends on the previous
//! bar's signal: all lookback lives in the indicator values.

pub mod evaluator;

pub use evaluator::{EvaluatedBar, SignalEvaluator};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sizing::OrderPlan;

/// Default take-profit distance, in percent of the close.
pub const DEFAULT_TARGET_PERCENT: f64 = 0.36;

/// Inputs the evaluator refuses to size.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum SignalError {
    #[error("capital must be positive (got {0})")]
    NonPositiveCapital(f64),

    #[error("risk per trade must be positive (got {0})")]
    NonPositiveRisk(f64),

    #[error("price must be positive (got {0})")]
    NonPositivePrice(f64),

    #[error("capital {capital} cannot be sized at price {close}")]
    UnsizablePlan { capital: f64, close: f64 },
}

/// Classification of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "plan", rename_all = "snake_case")]
pub enum Signal {
    NoSignal,
    /// RSI oversold and, when required, close below the lower band.
    BuyLow(OrderPlan),
    /// RSI overbought. Sized only when the thresholds ask for it.
    SellHigh(Option<OrderPlan>),
}

impl Signal {
    pub fn is_triggered(&self) -> bool {
        !matches!(self, Signal::NoSignal)
    }

    pub fn plan(&self) -> Option<&OrderPlan> {
        match self {
            Signal::NoSignal => None,
            Signal::BuyLow(plan) => Some(plan),
            Signal::SellHigh(plan) => plan.as_ref(),
        }
    }
}

/// Which dashboard flavour a configuration starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    BuySide,
    SellSide,
}

impl Variant {
    pub fn thresholds(self) -> ThresholdConfig {
        match self {
            Self::BuySide => ThresholdConfig::buy_side(),
            Self::SellSide => ThresholdConfig::sell_side(),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::BuySide => "BUY SIDE ENTRY",
            Self::SellSide => "SELL SIDE ENTRY",
        }
    }

    /// Market movers shown under the title, as `(class, label, url)`.
    pub fn header_links(self) -> &'static [(&'static str, &'static str, &'static str)] {
        match self {
            Self::BuySide => &[("gainer", "Top Gainer", "https://www.nseindia.com")],
            Self::SellSide => &[
                ("gainer", "Nifty 50 loser", "https://www.nseindia.com"),
                (
                    "loser",
                    "Nifty 500 loser",
                    "https://www.nseindia.com/market-data/live-equity-market?symbol=NIFTY%2050",
                ),
            ],
        }
    }
}

/// Trigger thresholds shared by both dashboard variants.
///
/// Buy: `rsi <= buy_rsi_max` (and `close < lower band` when required).
/// Sell: `rsi > sell_rsi_min`. The buy branch wins when both hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub buy_rsi_max: f64,
    pub sell_rsi_min: f64,
    pub require_below_lower_band_for_buy: bool,
    pub target_percent: f64,
    pub size_sell_signals: bool,
}

impl ThresholdConfig {
    pub fn buy_side() -> Self {
        Self {
            buy_rsi_max: 45.0,
            sell_rsi_min: 85.0,
            require_below_lower_band_for_buy: true,
            target_percent: DEFAULT_TARGET_PERCENT,
            size_sell_signals: false,
        }
    }

    pub fn sell_side() -> Self {
        Self {
            buy_rsi_max: 20.0,
            sell_rsi_min: 60.0,
            require_below_lower_band_for_buy: true,
            target_percent: DEFAULT_TARGET_PERCENT,
            size_sell_signals: true,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::buy_side()
    }
}
