//! Periodic snapshot refresh running alongside the server.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use bandwatch_runner::{render_html, run_pipeline, write_snapshot, RenderOptions};

use crate::AppState;

/// Run the pipeline once with the current state, write the snapshot file,
/// and keep the page in memory for `GET /snapshot`.
pub async fn refresh_once(app: &AppState) -> anyhow::Result<()> {
    let state = app.pipeline.read().await.clone();
    let provider = app.provider.clone();
    let path = app.snapshot_path.clone();

    let html = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
        let report = run_pipeline(&state, provider.as_ref());
        let failed = report.failures().count();
        if failed > 0 {
            tracing::warn!(failed, "refresh finished with failed symbols");
        }
        let html = render_html(
            &report,
            &RenderOptions {
                update_error: None,
                refreshed_at: Some(Utc::now().fixed_offset()),
            },
        );
        write_snapshot(&path, &html)?;
        Ok(html)
    })
    .await??;

    *app.snapshot.write().await = Some(html);
    Ok(())
}

/// Refresh every `period`, starting immediately. Errors are logged and the
/// loop keeps going.
pub fn spawn_refresh_task(app: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut iteration = 0u64;

        loop {
            ticker.tick().await;
            iteration += 1;
            match refresh_once(&app).await {
                Ok(()) => tracing::info!(
                    iteration,
                    path = %app.snapshot_path.display(),
                    "snapshot refreshed"
                ),
                Err(e) => tracing::error!(iteration, error = %format!("{e:#}"), "snapshot refresh failed"),
            }
        }
    })
}
