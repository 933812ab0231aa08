//! Per-bar indicator frame derived from a [`BarSeries`].

use serde::{Deserialize, Serialize};

use super::bollinger::{Bands, Bollinger, DEFAULT_BB_WINDOW, DEFAULT_NUM_STD_DEV};
use super::rsi::{Rsi, DEFAULT_RSI_WINDOW};
use super::Indicator;
use crate::domain::{Bar, BarSeries, Granularity};

/// Window sizes and band width for the indicator engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_window: usize,
    pub bb_window: usize,
    pub num_std_dev: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_window: DEFAULT_RSI_WINDOW,
            bb_window: DEFAULT_BB_WINDOW,
            num_std_dev: DEFAULT_NUM_STD_DEV,
        }
    }
}

/// One bar with its indicator values. `None` means "not warmed up yet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: Bar,
    pub rsi: Option<f64>,
    pub bands: Option<Bands>,
}

impl IndicatorRow {
    pub fn lower_band(&self) -> Option<f64> {
        self.bands.map(|b| b.lower)
    }

    /// Both RSI and the envelope are available.
    pub fn is_warm(&self) -> bool {
        self.rsi.is_some() && self.bands.is_some()
    }
}

/// Indicator values aligned one-to-one with the source series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub granularity: Granularity,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    /// Compute RSI and Bollinger Bands for every bar. The series is only read.
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Self {
        let bars = series.bars();
        let rsi = Rsi::new(params.rsi_window).compute(bars);
        let bands = Bollinger::lower(params.bb_window, params.num_std_dev).compute_bands(bars);

        let rows = bars
            .iter()
            .zip(rsi)
            .zip(bands)
            .map(|((bar, rsi), bands)| IndicatorRow {
                bar: bar.clone(),
                rsi,
                bands,
            })
            .collect();

        Self {
            symbol: series.symbol().to_string(),
            granularity: series.granularity(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where every indicator is defined, in series order.
    pub fn warm_rows(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.rows.iter().filter(|r| r.is_warm())
    }
}

/// Last RSI value of a series, `None` if the series never warms up.
pub fn latest_rsi(series: &BarSeries, window: usize) -> Option<f64> {
    Rsi::new(window).compute(series.bars()).last().copied().flatten()
}
