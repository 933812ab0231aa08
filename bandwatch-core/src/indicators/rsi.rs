//! Relative Strength Index (RSI).
//!
//! Average gain and average loss are plain rolling means of the last `period`
//! close-to-close changes (no Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100; both averages zero → RSI = 50.

use super::rolling::rolling_mean;
use super::Indicator;
use crate::domain::Bar;

pub const DEFAULT_RSI_WINDOW: usize = 23;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_RSI_WINDOW)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut gains = vec![None; n];
        let mut losses = vec![None; n];

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            gains[i] = Some(change.max(0.0));
            losses[i] = Some((-change).max(0.0));
        }

        let avg_gains = rolling_mean(&gains, self.period);
        let avg_losses = rolling_mean(&losses, self.period);

        avg_gains
            .into_iter()
            .zip(avg_losses)
            .map(|(gain, loss)| Some(rsi_from_averages(gain?, loss?)))
            .collect()
    }
}

/// RSI from average gain and loss, with the zero-loss cases pinned instead of
/// dividing by zero.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
