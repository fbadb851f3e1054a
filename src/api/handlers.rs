//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use super::AppState;
use super::types::{ErrorResponse, ResultsQuery, StateResponse, ValidationErrorResponse};
use crate::config::{IrradianceSourceKind, ProjectConfig};
use crate::error::SizingError;
use crate::project::{build_source, dimension_project};
use crate::sizing::{CompatibilityStatus, DimensioningResult};

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// Returns the served project's summary, metrics and best configuration.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse::from(&state.report))
}

/// Returns ranked results, optionally filtered.
///
/// `GET /results` → 200 + `Vec<DimensioningResult>` JSON
/// `GET /results?limit=N&min_status=good` → best N at `good` or better
/// `GET /results?min_status=bogus` → 400 + `ErrorResponse`
pub async fn get_results(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResultsQuery>,
) -> impl IntoResponse {
    let worst = match query.min_status.as_deref() {
        None => CompatibilityStatus::Problematic,
        Some(name) => match CompatibilityStatus::parse(name) {
            Some(status) => status,
            None => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!(
                        "unknown status `{name}`, expected excellent, good, acceptable or problematic"
                    ),
                ));
            }
        },
    };
    let limit = query.limit.unwrap_or(usize::MAX);

    let results: Vec<DimensioningResult> = state
        .report
        .results
        .iter()
        .filter(|r| r.compatibility_status <= worst)
        .take(limit)
        .cloned()
        .collect();

    Ok(Json(results))
}

/// Dimensions a submitted project against the server's catalog.
///
/// The catalog directory and remote irradiance endpoint always come from the
/// server; a remote source is refused when the server has none.
///
/// `POST /dimension` with a `ProjectConfig` JSON body
/// → 200 + `ProjectReport` JSON
/// → 400 + `ValidationErrorResponse` for an invalid project
/// → 400 + `ErrorResponse` for a remote source without a server endpoint
/// → 422 + `ErrorResponse` when no pairing is feasible
pub async fn post_dimension(
    State(state): State<Arc<AppState>>,
    Json(mut config): Json<ProjectConfig>,
) -> Response {
    config.catalog.dir = None;
    if config.irradiance.source == IrradianceSourceKind::Remote {
        let Some(endpoint) = &state.remote else {
            return error_response(
                StatusCode::BAD_REQUEST,
                "remote irradiance is not available on this server".to_string(),
            );
        };
        config.irradiance.remote_url = Some(endpoint.url.clone());
        config.irradiance.timeout_secs = endpoint.timeout_secs;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(ValidationErrorResponse { errors })).into_response();
    }

    // The remote irradiance client blocks.
    let outcome = tokio::task::spawn_blocking(move || {
        let source = build_source(&config.irradiance)?;
        dimension_project(&config, &state.catalog, &source)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(err @ SizingError::NoFeasibleConfiguration { .. })) => {
            warn!(error = %err, "submitted project has no feasible pairing");
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        Ok(Err(err @ SizingError::InvalidInput { .. })) => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Ok(Err(err)) => {
            error!(error = %err, "dimensioning failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(join) => {
            error!(error = %join, "dimensioning task panicked");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
    }
}
