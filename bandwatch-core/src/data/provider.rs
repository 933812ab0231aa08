//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import) so we can swap implementations and mock for tests.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::{BarError, BarSeries, Granularity, Period};

/// Structured error types for data operations.
///
/// These are designed to be displayable next to the symbol they belong to.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid bars: {0}")]
    InvalidBars(#[from] BarError),

    #[error("csv import error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Where the data came from. Reported by the server's health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
}

/// Trait for market data providers.
///
/// A successful fetch never returns an empty series: no bars is reported as
/// [`DataError::SymbolNotFound`].
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch bars for `symbol` covering `period` at `granularity`.
    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        granularity: Granularity,
    ) -> Result<BarSeries, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }

    /// How long requests stay blocked after the provider shut itself off.
    fn cooldown_remaining(&self) -> Duration {
        Duration::ZERO
    }

    /// Whether the symbol has any recent daily data.
    fn has_data(&self, symbol: &str) -> bool {
        self.fetch_bars(symbol, Period::OneDay, Granularity::Daily)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }
}
