//! Threshold-driven signal evaluator.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{Signal, SignalError, ThresholdConfig};
use crate::indicators::{IndicatorFrame, IndicatorRow};
use crate::sizing::{plan_order, RiskConfig, TradeSide};

/// One warmed-up bar with its classification, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedBar {
    pub timestamp: DateTime<FixedOffset>,
    pub close: f64,
    pub rsi: f64,
    pub lower_band: f64,
    pub upper_band: f64,
    pub sma: f64,
    pub signal: Signal,
}

/// Classifies bars against a [`ThresholdConfig`] and sizes triggered ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalEvaluator {
    thresholds: ThresholdConfig,
}

impl SignalEvaluator {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Classify one bar.
    ///
    /// Invalid capital, risk, or close is an error even when no indicator is
    /// available yet. Missing RSI or lower band yields `NoSignal`.
    pub fn evaluate(
        &self,
        rsi: Option<f64>,
        close: f64,
        lower_band: Option<f64>,
        risk: &RiskConfig,
    ) -> Result<Signal, SignalError> {
        risk.validate()?;
        if !close.is_finite() || close <= 0.0 {
            return Err(SignalError::NonPositivePrice(close));
        }

        let (Some(rsi), Some(lower_band)) = (rsi, lower_band) else {
            return Ok(Signal::NoSignal);
        };

        let t = &self.thresholds;
        let below_band = !t.require_below_lower_band_for_buy || close < lower_band;

        if rsi <= t.buy_rsi_max && below_band {
            let plan = plan_order(TradeSide::Long, close, risk, t.target_percent)?;
            return Ok(Signal::BuyLow(plan));
        }

        if rsi > t.sell_rsi_min {
            let plan = if t.size_sell_signals {
                Some(plan_order(TradeSide::Short, close, risk, t.target_percent)?)
            } else {
                None
            };
            return Ok(Signal::SellHigh(plan));
        }

        Ok(Signal::NoSignal)
    }

    /// Classify one frame row.
    pub fn evaluate_row(&self, row: &IndicatorRow, risk: &RiskConfig) -> Result<Signal, SignalError> {
        self.evaluate(row.rsi, row.bar.close, row.lower_band(), risk)
    }

    /// Classify every warmed-up row of a frame. Rows still in warm-up are
    /// left out, matching what the dashboard displays.
    pub fn evaluate_frame(
        &self,
        frame: &IndicatorFrame,
        risk: &RiskConfig,
    ) -> Result<Vec<EvaluatedBar>, SignalError> {
        frame
            .rows
            .iter()
            .filter_map(|row| {
                let rsi = row.rsi?;
                let bands = row.bands?;
                Some(self.evaluate_row(row, risk).map(|signal| EvaluatedBar {
                    timestamp: row.bar.timestamp,
                    close: row.bar.close,
                    rsi,
                    lower_band: bands.lower,
                    upper_band: bands.upper,
                    sma: bands.sma,
                    signal,
                }))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::ThresholdConfig;

    fn buy_side() -> SignalEvaluator {
        SignalEvaluator::new(ThresholdConfig::buy_side())
    }

    fn sell_side() -> SignalEvaluator {
        SignalEvaluator::new(ThresholdConfig::sell_side())
    }

    #[test]
    fn buy_side_buy_trigger() {
        let signal = buy_side()
            .evaluate(Some(45.0), 100.0, Some(101.0), &RiskConfig::default())
            .unwrap();
        let Signal::BuyLow(plan) = signal else {
            panic!("expected BuyLow, got {signal:?}");
        };
        assert!((plan.stop_loss - 99.65).abs() < 1e-9);
    }

    #[test]
    fn buy_requires_close_below_lower_band() {
        let signal = buy_side()
            .evaluate(Some(30.0), 100.0, Some(100.0), &RiskConfig::default())
            .unwrap();
        assert_eq!(signal, Signal::NoSignal);
    }

    #[test]
    fn band_requirement_can_be_disabled() {
        let mut t = ThresholdConfig::buy_side();
        t.require_below_lower_band_for_buy = false;
        let signal = SignalEvaluator::new(t)
            .evaluate(Some(30.0), 100.0, Some(90.0), &RiskConfig::default())
            .unwrap();
        assert!(matches!(signal, Signal::BuyLow(_)));
    }

    #[test]
    fn buy_side_sell_is_unsized() {
        let signal = buy_side()
            .evaluate(Some(85.5), 100.0, Some(90.0), &RiskConfig::default())
            .unwrap();
        assert_eq!(signal, Signal::SellHigh(None));
    }

    #[test]
    fn sell_threshold_is_strict() {
        let signal = buy_side()
            .evaluate(Some(85.0), 100.0, Some(90.0), &RiskConfig::default())
            .unwrap();
        assert_eq!(signal, Signal::NoSignal);
    }

    #[test]
    fn sell_side_sell_is_sized() {
        let signal = sell_side()
            .evaluate(Some(61.0), 200.0, Some(190.0), &RiskConfig::default())
            .unwrap();
        let plan = signal.plan().copied().unwrap();
        assert!((plan.quantity - 10_000.0).abs() < 1e-9);
        assert!((plan.stop_loss - 200.7).abs() < 1e-9);
        assert!((plan.target_price - 199.28).abs() < 1e-9);
    }

    #[test]
    fn sell_side_buy_needs_deep_oversold() {
        let e = sell_side();
        let risk = RiskConfig::default();
        assert_eq!(e.evaluate(Some(21.0), 100.0, Some(101.0), &risk).unwrap(), Signal::NoSignal);
        assert!(matches!(
            e.evaluate(Some(20.0), 100.0, Some(101.0), &risk).unwrap(),
            Signal::BuyLow(_)
        ));
    }

    #[test]
    fn missing_indicators_are_no_signal() {
        let e = buy_side();
        let risk = RiskConfig::default();
        assert_eq!(e.evaluate(None, 100.0, Some(101.0), &risk).unwrap(), Signal::NoSignal);
        assert_eq!(e.evaluate(Some(99.0), 100.0, None, &risk).unwrap(), Signal::NoSignal);
    }

    #[test]
    fn invalid_inputs_are_errors() {
        let e = buy_side();
        let risk = RiskConfig::default();
        assert_eq!(
            e.evaluate(Some(10.0), 0.0, Some(1.0), &risk),
            Err(SignalError::NonPositivePrice(0.0))
        );
        let broke = RiskConfig {
            capital: 0.0,
            risk_per_trade: 7_000.0,
        };
        assert_eq!(
            e.evaluate(Some(10.0), 100.0, Some(101.0), &broke),
            Err(SignalError::NonPositiveCapital(0.0))
        );
    }
}
