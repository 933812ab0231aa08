//! Bar granularity and history period, with their provider codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval covered by one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Intraday5m,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    /// Interval code understood by the chart API and used in CSV file names.
    pub fn interval_code(self) -> &'static str {
        match self {
            Self::Intraday5m => "5m",
            Self::Daily => "1d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interval_code())
    }
}

/// How far back a fetch reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    OneDay,
    OneYear,
    FiveYears,
    Max,
}

impl Period {
    pub fn range_code(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.range_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_codes() {
        assert_eq!(Granularity::Intraday5m.interval_code(), "5m");
        assert_eq!(Granularity::Weekly.to_string(), "1wk");
        assert_eq!(Period::Max.to_string(), "max");
    }
}
