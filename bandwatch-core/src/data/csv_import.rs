//! CSV import provider.
//!
//! Offline fallback when Yahoo is unavailable, and the fixture source for
//! tests. One file per symbol and granularity:
//! `<dir>/<SYMBOL>_<interval>.csv` with header
//! `timestamp,open,high,low,close,volume` and RFC 3339 timestamps.
//!
//! The `period` argument is ignored: the file is the whole history. Symbols
//! that could name a file outside the directory are treated as unknown.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::provider::{DataError, DataProvider, DataSource};
use crate::domain::{Bar, BarSeries, Granularity, Period};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: DateTime<FixedOffset>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<u64>,
}

/// Reads bar files from a directory.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file holding `symbol` at `granularity`, or `None` when the
    /// symbol is empty or contains a path separator or `..`.
    pub fn file_path(&self, symbol: &str, granularity: Granularity) -> Option<PathBuf> {
        let escapes = symbol.is_empty()
            || symbol.contains(['/', '\\'])
            || symbol.contains("..");
        if escapes {
            return None;
        }
        Some(
            self.dir
                .join(format!("{symbol}_{}.csv", granularity.interval_code())),
        )
    }

    fn read_bars(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;

        let mut bars = Vec::new();
        for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = record
                .map_err(|e| DataError::Csv(format!("{} row {}: {e}", path.display(), line + 1)))?;
            bars.push(Bar {
                timestamp: row.timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch_bars(
        &self,
        symbol: &str,
        _period: Period,
        granularity: Granularity,
    ) -> Result<BarSeries, DataError> {
        let Some(path) = self.file_path(symbol, granularity).filter(|p| p.exists()) else {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        };

        let bars = Self::read_bars(&path)?;
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(BarSeries::new(symbol, granularity, bars)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = "timestamp,open,high,low,close,volume\n\
2024-03-04T09:15:00+05:30,100.0,101.0,99.5,100.5,1200\n\
2024-03-04T09:20:00+05:30,100.5,102.0,100.0,101.5,\n";

    #[test]
    fn reads_series_from_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("TCS.NS_5m.csv"), SAMPLE).unwrap();

        let provider = CsvProvider::new(dir.path());
        let series = provider
            .fetch_bars("TCS.NS", Period::OneDay, Granularity::Intraday5m)
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].volume, Some(1200));
        assert_eq!(series.bars()[1].volume, None);
        assert_eq!(series.bars()[1].close, 101.5);
        assert_eq!(series.bars()[0].timestamp.offset().local_minus_utc(), 19_800);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        let err = provider
            .fetch_bars("NOPE", Period::OneDay, Granularity::Daily)
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
        assert!(!provider.has_data("NOPE"));
    }

    #[test]
    fn header_only_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("EMPTY_1d.csv"),
            "timestamp,open,high,low,close,volume\n",
        )
        .unwrap();
        let err = CsvProvider::new(dir.path())
            .fetch_bars("EMPTY", Period::OneYear, Granularity::Daily)
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn unordered_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let reversed = "timestamp,open,high,low,close,volume\n\
2024-03-04T09:20:00+05:30,1,1,1,1,1\n\
2024-03-04T09:15:00+05:30,1,1,1,1,1\n";
        fs::write(dir.path().join("REV_5m.csv"), reversed).unwrap();
        let err = CsvProvider::new(dir.path())
            .fetch_bars("REV", Period::OneDay, Granularity::Intraday5m)
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidBars(_)));
    }

    #[test]
    fn symbols_cannot_leave_the_data_dir() {
        let root = tempfile::tempdir().unwrap();
        let data = root.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(root.path().join("x_1d.csv"), SAMPLE).unwrap();

        let provider = CsvProvider::new(&data);
        for symbol in ["../x", "..\\x", "sub/x", ""] {
            assert!(provider.file_path(symbol, Granularity::Daily).is_none());
            let err = provider
                .fetch_bars(symbol, Period::OneYear, Granularity::Daily)
                .unwrap_err();
            assert!(matches!(err, DataError::SymbolNotFound { .. }), "{symbol}");
        }
        assert!(!provider.has_data("../x"));
    }
}
