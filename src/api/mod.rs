//! REST API for a dimensioned project.
//!
//! Provides three endpoints:
//! - `GET /state`: project summary, performance and financial figures
//! - `GET /results`: ranked results with optional filtering
//! - `POST /dimension`: dimension a submitted project

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::config::{IrradianceConfig, IrradianceSourceKind};
use crate::equipment::Catalog;
use crate::project::ProjectReport;

pub use types::{
    ErrorResponse, ProjectSummary, ResultsQuery, StateResponse, ValidationErrorResponse,
};

/// Immutable application state shared across all request handlers.
///
/// Built once after the startup project has been dimensioned and wrapped
/// in `Arc`; nothing in it changes afterwards.
pub struct AppState {
    /// Catalog used for submitted projects.
    pub catalog: Catalog,
    /// Report of the project the server was started with.
    pub report: ProjectReport,
    /// Irradiance service used for submitted projects with a remote source.
    /// `None` rejects such projects.
    pub remote: Option<RemoteEndpoint>,
}

/// Server-side remote irradiance settings. Submitted projects never choose
/// the address or timeout themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub url: String,
    pub timeout_secs: u64,
}

impl RemoteEndpoint {
    /// The endpoint of a configuration whose irradiance source is remote.
    pub fn from_config(cfg: &IrradianceConfig) -> Option<Self> {
        match (cfg.source, &cfg.remote_url) {
            (IrradianceSourceKind::Remote, Some(url)) => Some(Self {
                url: url.clone(),
                timeout_secs: cfg.timeout_secs,
            }),
            _ => None,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/results", get(handlers::get_results))
        .route("/dimension", post(handlers::post_dimension))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
