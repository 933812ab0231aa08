//! The dashboard pipeline: fetch → indicators → signals, per symbol.
//!
//! [`run_pipeline`] is a pure function of its inputs apart from the provider
//! it reads from. The HTTP handler and the periodic scheduler both call it;
//! neither needs to coordinate with the other.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use bandwatch_core::data::{DataError, DataProvider};
use bandwatch_core::domain::{Granularity, Period, Symbol};
use bandwatch_core::indicators::{latest_rsi, IndicatorFrame, IndicatorParams};
use bandwatch_core::signals::{EvaluatedBar, SignalError, SignalEvaluator, ThresholdConfig, Variant};
use bandwatch_core::sizing::RiskConfig;

use crate::config::{DashboardConfig, SYMBOL_SLOTS};

/// Everything one pipeline run depends on. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub variant: Variant,
    pub symbols: Vec<Symbol>,
    pub risk: RiskConfig,
    pub thresholds: ThresholdConfig,
    pub indicators: IndicatorParams,
}

impl PipelineState {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            variant: config.variant,
            symbols: config.resolved_symbols(),
            risk: config.risk,
            thresholds: config.resolved_thresholds(),
            indicators: config.indicators,
        }
    }
}

/// A form submission. Blank fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub tickers: Vec<String>,
    pub capital: String,
    pub risk: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpdateError {
    #[error("{}", invalid_ticker_message(.0))]
    InvalidTickers(Vec<String>),

    #[error("Invalid capital: {0}. ")]
    InvalidCapital(String),

    #[error("Invalid risk: {0}. ")]
    InvalidRisk(String),
}

fn invalid_ticker_message(tickers: &[String]) -> String {
    tickers
        .iter()
        .map(|t| format!("Invalid ticker symbol: {t}. "))
        .collect()
}

fn parse_amount(raw: &str, current: f64) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(current);
    }
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Apply a form update, returning the new state.
///
/// Tickers are trimmed and upper-cased. Only tickers that differ from the
/// current slot are checked against the provider; every invalid one is
/// reported. On any error the current state stays in effect.
pub fn apply_update(
    state: &PipelineState,
    update: &ConfigUpdate,
    provider: &dyn DataProvider,
) -> Result<PipelineState, UpdateError> {
    let mut symbols = state.symbols.clone();
    let mut changed = Vec::new();

    for (slot, raw) in update.tickers.iter().take(SYMBOL_SLOTS).enumerate() {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            continue;
        }
        match symbols.get_mut(slot) {
            Some(current) if *current == ticker => {}
            Some(current) => {
                *current = ticker.clone();
                changed.push(ticker);
            }
            None => {
                symbols.push(ticker.clone());
                changed.push(ticker);
            }
        }
    }

    let invalid: Vec<String> = changed
        .into_iter()
        .filter(|t| !provider.has_data(t))
        .collect();
    if !invalid.is_empty() {
        tracing::warn!(?invalid, "rejecting update with invalid tickers");
        return Err(UpdateError::InvalidTickers(invalid));
    }

    let capital = parse_amount(&update.capital, state.risk.capital)
        .ok_or_else(|| UpdateError::InvalidCapital(update.capital.trim().to_string()))?;
    let risk_per_trade = parse_amount(&update.risk, state.risk.risk_per_trade)
        .ok_or_else(|| UpdateError::InvalidRisk(update.risk.trim().to_string()))?;

    Ok(PipelineState {
        symbols,
        risk: RiskConfig {
            capital,
            risk_per_trade,
        },
        ..state.clone()
    })
}

/// Why one symbol could not be analysed.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] SignalError),
}

/// Latest RSI on the long-horizon charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RsiLevels {
    pub daily: Option<f64>,
    pub weekly: Option<f64>,
    pub monthly: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolAnalysis {
    pub levels: RsiLevels,
    /// Warmed-up intraday bars with their signals, oldest first.
    pub bars: Vec<EvaluatedBar>,
}

#[derive(Debug)]
pub enum SymbolOutcome {
    Ready(SymbolAnalysis),
    Failed(SymbolError),
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: Symbol,
    pub outcome: SymbolOutcome,
}

impl SymbolReport {
    pub fn analysis(&self) -> Option<&SymbolAnalysis> {
        match &self.outcome {
            SymbolOutcome::Ready(a) => Some(a),
            SymbolOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SymbolError> {
        match &self.outcome {
            SymbolOutcome::Ready(_) => None,
            SymbolOutcome::Failed(e) => Some(e),
        }
    }
}

/// Result of one pipeline run, in configured symbol order.
#[derive(Debug)]
pub struct DashboardReport {
    pub variant: Variant,
    pub risk: RiskConfig,
    pub thresholds: ThresholdConfig,
    pub symbols: Vec<SymbolReport>,
}

impl DashboardReport {
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SymbolError)> {
        self.symbols
            .iter()
            .filter_map(|r| r.error().map(|e| (r.symbol.as_str(), e)))
    }
}

const LEVEL_CHARTS: [(Period, Granularity); 3] = [
    (Period::OneYear, Granularity::Daily),
    (Period::FiveYears, Granularity::Weekly),
    (Period::Max, Granularity::Monthly),
];

fn analyze_symbol(
    symbol: &str,
    state: &PipelineState,
    provider: &dyn DataProvider,
) -> Result<SymbolAnalysis, SymbolError> {
    let intraday = provider.fetch_bars(symbol, Period::OneDay, Granularity::Intraday5m)?;
    let frame = IndicatorFrame::compute(&intraday, &state.indicators);
    let bars = SignalEvaluator::new(state.thresholds).evaluate_frame(&frame, &state.risk)?;

    let mut latest = [None; 3];
    for (slot, (period, granularity)) in latest.iter_mut().zip(LEVEL_CHARTS) {
        let series = provider.fetch_bars(symbol, period, granularity)?;
        *slot = latest_rsi(&series, state.indicators.rsi_window);
    }
    let [daily, weekly, monthly] = latest;

    Ok(SymbolAnalysis {
        levels: RsiLevels {
            daily,
            weekly,
            monthly,
        },
        bars,
    })
}

/// Run the dashboard pipeline for every configured symbol.
///
/// Symbols are processed in parallel and independently: a failure is
/// recorded against its symbol and never stops the others.
pub fn run_pipeline(state: &PipelineState, provider: &dyn DataProvider) -> DashboardReport {
    let symbols = state
        .symbols
        .par_iter()
        .map(|symbol| {
            let outcome = match analyze_symbol(symbol, state, provider) {
                Ok(analysis) => {
                    tracing::info!(
                        symbol = %symbol,
                        rows = analysis.bars.len(),
                        triggered = analysis.bars.iter().filter(|b| b.signal.is_triggered()).count(),
                        "symbol analysed"
                    );
                    SymbolOutcome::Ready(analysis)
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "symbol failed");
                    SymbolOutcome::Failed(e)
                }
            };
            SymbolReport {
                symbol: symbol.clone(),
                outcome,
            }
        })
        .collect();

    DashboardReport {
        variant: state.variant,
        risk: state.risk,
        thresholds: state.thresholds,
        symbols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandwatch_core::data::DataSource;
    use bandwatch_core::domain::BarSeries;

    /// Knows a fixed set of symbols; every fetch returns an empty-but-valid
    /// answer only through `has_data`.
    struct KnownSymbols(Vec<&'static str>);

    impl DataProvider for KnownSymbols {
        fn name(&self) -> &str {
            "known"
        }
        fn source(&self) -> DataSource {
            DataSource::CsvImport
        }
        fn fetch_bars(
            &self,
            symbol: &str,
            _period: Period,
            _granularity: Granularity,
        ) -> Result<BarSeries, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
        fn has_data(&self, symbol: &str) -> bool {
            self.0.contains(&symbol)
        }
    }

    fn state() -> PipelineState {
        PipelineState::from_config(&DashboardConfig::default())
    }

    #[test]
    fn blank_fields_keep_current_values() {
        let current = state();
        let next = apply_update(&current, &ConfigUpdate::default(), &KnownSymbols(vec![])).unwrap();
        assert_eq!(next, current);
    }

    #[test]
    fn tickers_are_normalised_and_validated() {
        let current = state();
        let update = ConfigUpdate {
            tickers: vec![" infy.ns ".into(), String::new(), "DRREDDY.NS".into()],
            capital: "1,000,000".into(),
            risk: "5000".into(),
        };
        let next = apply_update(&current, &update, &KnownSymbols(vec!["INFY.NS"])).unwrap();
        assert_eq!(next.symbols, vec!["INFY.NS", "HDFCBANK.NS", "DRREDDY.NS"]);
        assert_eq!(next.risk.capital, 1_000_000.0);
        assert_eq!(next.risk.risk_per_trade, 5_000.0);
        assert_eq!(next.thresholds, current.thresholds);
    }

    #[test]
    fn all_invalid_tickers_are_reported() {
        let update = ConfigUpdate {
            tickers: vec!["BAD1".into(), "BAD2".into(), String::new()],
            ..ConfigUpdate::default()
        };
        let err = apply_update(&state(), &update, &KnownSymbols(vec![])).unwrap_err();
        assert_eq!(err, UpdateError::InvalidTickers(vec!["BAD1".into(), "BAD2".into()]));
        assert_eq!(
            err.to_string(),
            "Invalid ticker symbol: BAD1. Invalid ticker symbol: BAD2. "
        );
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        let update = ConfigUpdate {
            capital: "0".into(),
            ..ConfigUpdate::default()
        };
        let err = apply_update(&state(), &update, &KnownSymbols(vec![])).unwrap_err();
        assert_eq!(err, UpdateError::InvalidCapital("0".into()));

        let update = ConfigUpdate {
            risk: "lots".into(),
            ..ConfigUpdate::default()
        };
        assert!(matches!(
            apply_update(&state(), &update, &KnownSymbols(vec![])),
            Err(UpdateError::InvalidRisk(_))
        ));
    }

    #[test]
    fn failing_provider_fails_every_symbol_without_panicking() {
        let report = run_pipeline(&state(), &KnownSymbols(vec![]));
        assert_eq!(report.symbols.len(), 3);
        assert_eq!(report.failures().count(), 3);
        assert_eq!(report.symbols[0].symbol, "DIVISLAB.NS");
    }
}
