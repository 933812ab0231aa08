//! Bar, the basic market data unit, and the validated series built from it.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::granularity::Granularity;

/// OHLC bar for a single symbol over one interval.
///
/// The timestamp carries the exchange offset reported by the provider, so
/// intraday buckets render in market-local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    /// OHLC consistency: no NaN, the range covers open and close, and
    /// open and close are positive.
    pub fn is_sane(&self) -> bool {
        let void =
            self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan();
        !void
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Why a bar sequence was refused as a [`BarSeries`].
#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bar {index} for {symbol} is not after the previous bar ({timestamp})")]
    OutOfOrder {
        symbol: String,
        index: usize,
        timestamp: DateTime<FixedOffset>,
    },

    #[error("bar {index} for {symbol} has a non-positive close ({close})")]
    NonPositiveClose {
        symbol: String,
        index: usize,
        close: f64,
    },

    #[error("bar {index} for {symbol} has inconsistent OHLC values")]
    Inconsistent { symbol: String, index: usize },
}

/// Ordered bars for one symbol at one granularity.
///
/// Invariants (checked by [`BarSeries::new`]): timestamps strictly ascending,
/// every close finite and positive, every bar [`Bar::is_sane`]. An empty series is allowed; callers that
/// need data treat it as "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    granularity: Granularity,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        granularity: Granularity,
        bars: Vec<Bar>,
    ) -> Result<Self, BarError> {
        let symbol = symbol.into();

        for (index, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(BarError::NonPositiveClose {
                    symbol,
                    index,
                    close: bar.close,
                });
            }
            if !bar.is_sane() {
                return Err(BarError::Inconsistent { symbol, index });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(BarError::OutOfOrder {
                    symbol,
                    index,
                    timestamp: bar.timestamp,
                });
            }
        }

        Ok(Self {
            symbol,
            granularity,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
