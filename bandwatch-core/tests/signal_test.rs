//! End-to-end signal tests: bars → indicator frame → evaluated bars.

use chrono::{Duration, FixedOffset, TimeZone};
use bandwatch_core::domain::{Bar, BarSeries, Granularity};
use bandwatch_core::indicators::{IndicatorFrame, IndicatorParams};
use bandwatch_core::signals::{Signal, SignalEvaluator, ThresholdConfig};
use bandwatch_core::sizing::RiskConfig;

fn series(closes: &[f64]) -> BarSeries {
    let ist = FixedOffset::east_opt(19_800).unwrap();
    let start = ist.with_ymd_and_hms(2024, 3, 4, 9, 15, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: start + Duration::minutes(5 * i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: Some(500),
        })
        .collect();
    BarSeries::new("DRREDDY.NS", Granularity::Intraday5m, bars).unwrap()
}

/// 30 flat-ish bars followed by a sharp drop: the drop pushes RSI down and
/// the close under the lower band.
fn selloff() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + if i % 2 == 0 { 0.2 } else { -0.2 }).collect();
    closes.extend([98.0, 96.0, 94.0]);
    closes
}

/// Mirror image: a sharp rally after a quiet stretch.
fn rally() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + if i % 2 == 0 { 0.2 } else { -0.2 }).collect();
    closes.extend([102.0, 104.0, 106.0]);
    closes
}

#[test]
fn warm_up_rows_are_dropped() {
    let frame = IndicatorFrame::compute(&series(&selloff()), &IndicatorParams::default());
    let evaluated = SignalEvaluator::new(ThresholdConfig::buy_side())
        .evaluate_frame(&frame, &RiskConfig::default())
        .unwrap();
    assert_eq!(evaluated.len(), selloff().len() - 23);
    assert_eq!(evaluated[0].timestamp, frame.rows[23].bar.timestamp);
}

#[test]
fn selloff_triggers_buy_low_on_buy_side() {
    let frame = IndicatorFrame::compute(&series(&selloff()), &IndicatorParams::default());
    let evaluated = SignalEvaluator::new(ThresholdConfig::buy_side())
        .evaluate_frame(&frame, &RiskConfig::default())
        .unwrap();

    let last = evaluated.last().unwrap();
    assert!(last.rsi <= 45.0, "rsi {}", last.rsi);
    assert!(last.close < last.lower_band);
    let Signal::BuyLow(plan) = last.signal else {
        panic!("expected BuyLow, got {:?}", last.signal);
    };
    assert_eq!(plan.price, 94.0);
    assert!(plan.stop_loss < 94.0);
    assert!(plan.target_price > 94.0);
}

#[test]
fn rally_triggers_sized_sell_on_sell_side_only() {
    let frame = IndicatorFrame::compute(&series(&rally()), &IndicatorParams::default());
    let risk = RiskConfig::default();

    let sell = SignalEvaluator::new(ThresholdConfig::sell_side())
        .evaluate_frame(&frame, &risk)
        .unwrap();
    let last = sell.last().unwrap();
    assert!(last.rsi > 60.0);
    let plan = last.signal.plan().expect("sell side sizes sells");
    assert!(plan.stop_loss > plan.price);
    assert!(plan.target_price < plan.price);

    let buy = SignalEvaluator::new(ThresholdConfig::buy_side())
        .evaluate_frame(&frame, &risk)
        .unwrap();
    let last = buy.last().unwrap();
    if last.rsi > 85.0 {
        assert_eq!(last.signal, Signal::SellHigh(None));
    } else {
        assert_eq!(last.signal, Signal::NoSignal);
    }
}

#[test]
fn quiet_market_has_no_signals() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + if i % 2 == 0 { 0.1 } else { -0.1 }).collect();
    let frame = IndicatorFrame::compute(&series(&closes), &IndicatorParams::default());
    let evaluated = SignalEvaluator::new(ThresholdConfig::buy_side())
        .evaluate_frame(&frame, &RiskConfig::default())
        .unwrap();
    assert!(evaluated.iter().all(|b| b.signal == Signal::NoSignal));
}

#[test]
fn invalid_risk_fails_the_whole_frame() {
    let frame = IndicatorFrame::compute(&series(&selloff()), &IndicatorParams::default());
    let risk = RiskConfig {
        capital: 2_000_000.0,
        risk_per_trade: 0.0,
    };
    assert!(SignalEvaluator::new(ThresholdConfig::buy_side())
        .evaluate_frame(&frame, &risk)
        .is_err());
}
