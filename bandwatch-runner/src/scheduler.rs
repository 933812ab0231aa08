//! Blocking refresh loop for unattended snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;

use bandwatch_core::data::DataProvider;

use crate::pipeline::{run_pipeline, PipelineState};
use crate::reporting::{render_html, RenderOptions};
use crate::snapshot::write_snapshot;

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub interval: Duration,
    /// Stop after this many refreshes; `None` runs until cancelled.
    pub max_iterations: Option<usize>,
    pub snapshot_path: std::path::PathBuf,
}

/// What one refresh produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub iteration: usize,
    pub symbols: usize,
    pub failed: usize,
    pub triggered: usize,
    pub snapshot_written: bool,
}

/// Granularity at which the sleep checks the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(200);

fn sleep_unless_cancelled(total: Duration, cancel: Option<&AtomicBool>) {
    let deadline = Instant::now() + total;
    loop {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(CANCEL_POLL));
    }
}

/// Run the pipeline on a fixed cadence, writing an HTML snapshot each time.
///
/// A failed snapshot write is logged and the loop keeps going. Returns the
/// number of completed refreshes.
pub fn run_periodic(
    state: &PipelineState,
    provider: &dyn DataProvider,
    config: &ScheduleConfig,
    on_tick: Option<&dyn Fn(&TickSummary)>,
    cancel: Option<&AtomicBool>,
) -> usize {
    let mut iteration = 0;

    loop {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            break;
        }
        if config.max_iterations.is_some_and(|max| iteration >= max) {
            break;
        }

        let report = run_pipeline(state, provider);
        let options = RenderOptions {
            update_error: None,
            refreshed_at: Some(Utc::now().fixed_offset()),
        };
        let html = render_html(&report, &options);

        let snapshot_written = match write_snapshot(&config.snapshot_path, &html) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(iteration, error = %format!("{e:#}"), "snapshot write failed");
                false
            }
        };

        let summary = TickSummary {
            iteration,
            symbols: report.symbols.len(),
            failed: report.failures().count(),
            triggered: report
                .symbols
                .iter()
                .filter_map(|r| r.analysis())
                .flat_map(|a| a.bars.iter())
                .filter(|b| b.signal.is_triggered())
                .count(),
            snapshot_written,
        };
        tracing::info!(
            iteration,
            failed = summary.failed,
            triggered = summary.triggered,
            path = %config.snapshot_path.display(),
            "refresh complete"
        );
        if let Some(cb) = on_tick {
            cb(&summary);
        }

        iteration += 1;
        if config.max_iterations.is_some_and(|max| iteration >= max) {
            break;
        }
        sleep_unless_cancelled(config.interval, cancel);
    }

    iteration
}
