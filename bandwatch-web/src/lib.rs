//! Bandwatch Web: the dashboard served over HTTP.
//!
//! Routes:
//! - `GET /`: run the pipeline for the current state and render the page
//! - `POST /`: apply a form update, then render (errors shown on the page)
//! - `GET /snapshot`: the last page written by the refresh task
//! - `GET /health`: liveness, provider source and cooldown, configured symbols
//!
//! Pipeline runs are blocking (HTTP fetches, rayon) and always go through
//! `spawn_blocking`.

mod handlers;
mod refresh;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::{Mutex, RwLock};

use bandwatch_core::data::DataProvider;
use bandwatch_runner::PipelineState;

pub use handlers::UpdateForm;
pub use refresh::{refresh_once, spawn_refresh_task};

/// Application state shared across all handlers and the refresh task.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn DataProvider>,
    pub pipeline: Arc<RwLock<PipelineState>>,
    /// Held by `POST /` from reading the state until the new state is stored.
    pub update_lock: Arc<Mutex<()>>,
    /// Last page written by the refresh task.
    pub snapshot: Arc<RwLock<Option<String>>>,
    pub snapshot_path: PathBuf,
}

impl AppState {
    pub fn new(provider: Arc<dyn DataProvider>, state: PipelineState, snapshot_path: PathBuf) -> Self {
        Self {
            provider,
            pipeline: Arc::new(RwLock::new(state)),
            update_lock: Arc::new(Mutex::new(())),
            snapshot: Arc::new(RwLock::new(None)),
            snapshot_path,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::update))
        .route("/snapshot", get(handlers::snapshot))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("Registering routes:");
    tracing::info!("  GET  /");
    tracing::info!("  POST /");
    tracing::info!("  GET  /snapshot");
    tracing::info!("  GET  /health");

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
