use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// `GET /health`
///
/// Readiness probe backed by a database ping.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();

    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: label,
            database,
            uptime_seconds: state.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}
