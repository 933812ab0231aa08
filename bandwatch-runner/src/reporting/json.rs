//! JSON export of a dashboard run.

use serde::Serialize;

use bandwatch_core::signals::{ThresholdConfig, Variant};
use bandwatch_core::sizing::RiskConfig;

use crate::pipeline::{DashboardReport, SymbolAnalysis, SymbolOutcome};

/// Serializable view of a [`DashboardReport`]. Errors are flattened to text.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub variant: Variant,
    pub risk: RiskConfig,
    pub thresholds: ThresholdConfig,
    pub symbols: Vec<SymbolView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SymbolView<'a> {
    pub symbol: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<&'a SymbolAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> From<&'a DashboardReport> for DashboardView<'a> {
    fn from(report: &'a DashboardReport) -> Self {
        let symbols = report
            .symbols
            .iter()
            .map(|entry| match &entry.outcome {
                SymbolOutcome::Ready(analysis) => SymbolView {
                    symbol: &entry.symbol,
                    analysis: Some(analysis),
                    error: None,
                },
                SymbolOutcome::Failed(e) => SymbolView {
                    symbol: &entry.symbol,
                    analysis: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();
        Self {
            variant: report.variant,
            risk: report.risk,
            thresholds: report.thresholds,
            symbols,
        }
    }
}

/// Pretty-printed JSON for a report.
pub fn render_json(report: &DashboardReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DashboardView::from(report))
}
