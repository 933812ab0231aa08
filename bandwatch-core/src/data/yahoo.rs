//! Yahoo Finance data provider.
//!
//! Fetches OHLCV bars from Yahoo's v8 chart API for a `range`/`interval`
//! pair (e.g. `1d`/`5m` for today's intraday buckets, `max`/`1mo` for the
//! monthly history). Handles rate limiting, retries with exponential backoff,
//! response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV import provider is the fallback when Yahoo is unavailable.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource};
use crate::domain::{Bar, BarSeries, Granularity, Period};

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Build the chart API URL for a symbol, range, and interval.
    fn chart_url(symbol: &str, period: Period, granularity: Granularity) -> String {
        format!(
            "{CHART_BASE_URL}/{symbol}?range={}&interval={}&includePrePost=false",
            period.range_code(),
            granularity.interval_code()
        )
    }

    /// Parse the chart API response into bars.
    ///
    /// Buckets with no close (halts, holidays, the still-open last bucket on
    /// some feeds) or with an inconsistent high/low are dropped; the rest is
    /// handed to [`BarSeries::new`].
    fn parse_response(
        symbol: &str,
        granularity: Granularity,
        resp: ChartResponse,
    ) -> Result<BarSeries, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let offset = data
            .meta
            .and_then(|m| m.gmtoffset)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());

        // A valid symbol outside trading hours comes back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.with_timezone(&offset))
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };
            let open = quote.open.get(i).copied().flatten().unwrap_or(close);
            let high = quote.high.get(i).copied().flatten().unwrap_or(close);
            let low = quote.low.get(i).copied().flatten().unwrap_or(close);
            let bar = Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten(),
            };
            if !bar.is_sane() {
                tracing::debug!(symbol, %timestamp, "skipping inconsistent bucket");
                continue;
            }

            // Yahoo occasionally repeats the live bucket; keep the newest copy.
            if bars.last().is_some_and(|prev: &Bar| prev.timestamp >= timestamp) {
                bars.pop();
            }
            bars.push(bar);
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(BarSeries::new(symbol, granularity, bars)?)
    }

    /// Decide what one HTTP response means for the retry loop.
    fn classify(
        &self,
        symbol: &str,
        granularity: Granularity,
        resp: reqwest::blocking::Response,
    ) -> Attempt {
        use reqwest::StatusCode;

        let status = resp.status();
        match status {
            // Yahoo answers an IP ban with 403; stop hammering it.
            StatusCode::FORBIDDEN => {
                self.circuit_breaker.trip();
                Attempt::Done(Err(DataError::CircuitBreakerTripped))
            }
            StatusCode::NOT_FOUND => {
                self.circuit_breaker.record_success();
                Attempt::Done(Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }))
            }
            StatusCode::UNAUTHORIZED => Attempt::Done(Err(DataError::AuthenticationRequired(
                format!("chart request for {symbol} was refused"),
            ))),
            StatusCode::TOO_MANY_REQUESTS => {
                self.circuit_breaker.record_failure();
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                Attempt::Retry(DataError::RateLimited { retry_after_secs })
            }
            s if !s.is_success() => {
                self.circuit_breaker.record_failure();
                Attempt::Retry(DataError::Other(format!("HTTP {s} for {symbol}")))
            }
            _ => {
                let parsed = resp
                    .json::<ChartResponse>()
                    .map_err(|e| {
                        DataError::ResponseFormatChanged(format!("undecodable chart for {symbol}: {e}"))
                    })
                    .and_then(|chart| Self::parse_response(symbol, granularity, chart));
                if parsed.is_ok() {
                    self.circuit_breaker.record_success();
                }
                Attempt::Done(parsed)
            }
        }
    }

    /// GET the chart, retrying transient failures with exponential backoff.
    fn fetch_with_retry(
        &self,
        symbol: &str,
        period: Period,
        granularity: Granularity,
    ) -> Result<BarSeries, DataError> {
        let url = Self::chart_url(symbol, period, granularity);
        let mut last_error = DataError::Other(format!("no attempt made for {symbol}"));

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(symbol, attempt, ?delay, error = %last_error, "retrying chart request");
                std::thread::sleep(delay);
            }
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let outcome = match self.client.get(&url).send() {
                Ok(resp) => self.classify(symbol, granularity, resp),
                Err(e) if e.is_connect() || e.is_timeout() => {
                    Attempt::Retry(DataError::NetworkUnreachable(e.to_string()))
                }
                Err(e) => Attempt::Done(Err(DataError::NetworkUnreachable(e.to_string()))),
            };

            match outcome {
                Attempt::Done(result) => return result,
                Attempt::Retry(e) => last_error = e,
            }
        }

        tracing::warn!(symbol, error = %last_error, "chart request gave up after retries");
        Err(last_error)
    }
}

/// Result of one request attempt.
enum Attempt {
    Done(Result<BarSeries, DataError>),
    Retry(DataError),
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        granularity: Granularity,
    ) -> Result<BarSeries, DataError> {
        tracing::debug!(symbol, %period, %granularity, "fetching chart");
        self.fetch_with_retry(symbol, period, granularity)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }

    fn cooldown_remaining(&self) -> Duration {
        self.circuit_breaker.remaining_cooldown()
    }
}
