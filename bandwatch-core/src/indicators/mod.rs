//! Indicator engine: RSI and Bollinger Bands.
//!
//! Indicators are pure functions: bar history in, one value per bar out.
//! Warm-up bars carry `None`, never a placeholder number.

pub mod bollinger;
pub mod frame;
pub mod rolling;
pub mod rsi;

pub use bollinger::{Bands, Bollinger, BollingerBand};
pub use frame::{latest_rsi, IndicatorFrame, IndicatorParams, IndicatorRow};
pub use rsi::{rsi_from_averages, Rsi};

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce an output series of the same
/// length. The first `lookback()` values are `None` (warmup).
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_23").
    fn name(&self) -> &str;

    /// Number of leading bars that produce no value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Create synthetic 5-minute bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high/low = max/min ± 1.0.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::{FixedOffset, TimeZone};
    let ist = FixedOffset::east_opt(19_800).unwrap();
    let start = ist.with_ymd_and_hms(2024, 1, 2, 9, 15, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + chrono::Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(0.01),
                close,
                volume: Some(1000),
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
