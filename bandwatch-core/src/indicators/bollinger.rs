//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses sample stddev (divide by N - 1).
//! Lookback: period - 1.

use serde::{Deserialize, Serialize};

use super::rolling::{rolling_mean, rolling_sample_std};
use super::Indicator;
use crate::domain::Bar;

pub const DEFAULT_BB_WINDOW: usize = 20;
pub const DEFAULT_NUM_STD_DEV: f64 = 2.0;

/// Which band of the Bollinger Bands the [`Indicator`] impl yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

/// The full envelope at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub sma: f64,
    pub stddev: f64,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        assert!(multiplier >= 0.0, "Bollinger multiplier must be >= 0");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    /// Compute the whole envelope per bar in one pass over the closes.
    pub fn compute_bands(&self, bars: &[Bar]) -> Vec<Option<Bands>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let wrapped: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
        let means = rolling_mean(&wrapped, self.period);
        let stddevs = rolling_sample_std(&closes, self.period);

        means
            .into_iter()
            .zip(stddevs)
            .map(|(sma, stddev)| {
                let (sma, stddev) = (sma?, stddev?);
                Some(Bands {
                    sma,
                    stddev,
                    upper: sma + self.multiplier * stddev,
                    lower: sma - self.multiplier * stddev,
                })
            })
            .collect()
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        self.compute_bands(bars)
            .into_iter()
            .map(|bands| {
                bands.map(|b| match self.band {
                    BollingerBand::Upper => b.upper,
                    BollingerBand::Middle => b.sma,
                    BollingerBand::Lower => b.lower,
                })
            })
            .collect()
    }
}
