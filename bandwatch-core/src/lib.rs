//! bandwatch core: bars, indicators, signal evaluation, market data.
//!
//! This crate contains the pure part of the dashboard plus its data sources:
//! - Domain types (bars, validated bar series, granularities)
//! - Indicator engine (rolling-mean RSI, Bollinger Bands) producing an `IndicatorFrame`
//! - Signal evaluator driven by a `ThresholdConfig`, with risk-budget sizing
//! - Data providers (Yahoo Finance chart API, CSV import) behind the `DataProvider` trait
//!
//! Nothing here holds mutable state between calls except the provider's
//! circuit breaker, so every function can be called from several threads at once.

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signals;
pub mod sizing;
