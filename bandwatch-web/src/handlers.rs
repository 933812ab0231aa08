use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use bandwatch_core::data::DataSource;
use bandwatch_runner::{
    apply_update, render_html, run_pipeline, ConfigUpdate, PipelineState, RenderOptions,
};

use crate::AppState;

/// Fields posted by the dashboard form. Missing fields count as blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateForm {
    pub ticker1: String,
    pub ticker2: String,
    pub ticker3: String,
    pub capital: String,
    pub risk: String,
}

impl From<UpdateForm> for ConfigUpdate {
    fn from(form: UpdateForm) -> Self {
        ConfigUpdate {
            tickers: vec![form.ticker1, form.ticker2, form.ticker3],
            capital: form.capital,
            risk: form.risk,
        }
    }
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}")).into_response()
}

async fn render_page(app: &AppState, state: PipelineState, update_error: Option<String>) -> Response {
    let provider = app.provider.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        let report = run_pipeline(&state, provider.as_ref());
        let options = RenderOptions {
            update_error,
            refreshed_at: Some(Utc::now().fixed_offset()),
        };
        render_html(&report, &options)
    })
    .await;

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => internal_error(e),
    }
}

pub(crate) async fn index(State(app): State<AppState>) -> Response {
    let state = app.pipeline.read().await.clone();
    render_page(&app, state, None).await
}

pub(crate) async fn update(State(app): State<AppState>, Form(form): Form<UpdateForm>) -> Response {
    let update = ConfigUpdate::from(form);
    // One update at a time, each applied on top of the last stored state.
    let guard = app.update_lock.lock().await;
    let current = app.pipeline.read().await.clone();

    let provider = app.provider.clone();
    let applied =
        tokio::task::spawn_blocking(move || apply_update(&current, &update, provider.as_ref()))
            .await;

    let update_error = match applied {
        Ok(Ok(next)) => {
            tracing::info!(symbols = ?next.symbols, capital = next.risk.capital, risk = next.risk.risk_per_trade, "dashboard updated");
            *app.pipeline.write().await = next;
            None
        }
        Ok(Err(e)) => Some(e.to_string()),
        Err(e) => return internal_error(e),
    };

    let state = app.pipeline.read().await.clone();
    drop(guard);
    render_page(&app, state, update_error).await
}

pub(crate) async fn snapshot(State(app): State<AppState>) -> Response {
    match app.snapshot.read().await.as_ref() {
        Some(html) => Html(html.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no snapshot yet").into_response(),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    provider: String,
    source: DataSource,
    provider_available: bool,
    cooldown_secs: u64,
    symbols: Vec<String>,
    has_snapshot: bool,
}

pub(crate) async fn health(State(app): State<AppState>) -> Json<HealthResponse> {
    let symbols = app.pipeline.read().await.symbols.clone();
    let has_snapshot = app.snapshot.read().await.is_some();
    Json(HealthResponse {
        status: "ok",
        provider: app.provider.name().to_string(),
        source: app.provider.source(),
        provider_available: app.provider.is_available(),
        cooldown_secs: app.provider.cooldown_remaining().as_secs(),
        symbols,
        has_snapshot,
    })
}
