//! Bandwatch Runner: dashboard orchestration on top of `bandwatch-core`.
//!
//! This crate provides:
//! - TOML configuration with variant presets and overrides
//! - The per-symbol pipeline (fetch, indicators, signals) and form updates
//! - HTML and JSON rendering of a dashboard run
//! - Atomic snapshot files and a blocking refresh loop

pub mod config;
pub mod pipeline;
pub mod reporting;
pub mod scheduler;
pub mod snapshot;

pub use config::{default_symbols, ConfigError, DashboardConfig, ThresholdOverrides};
pub use pipeline::{
    apply_update, run_pipeline, ConfigUpdate, DashboardReport, PipelineState, RsiLevels,
    SymbolAnalysis, SymbolError, SymbolOutcome, SymbolReport, UpdateError,
};
pub use reporting::{render_html, render_json, RenderOptions};
pub use scheduler::{run_periodic, ScheduleConfig, TickSummary};
pub use snapshot::write_snapshot;
