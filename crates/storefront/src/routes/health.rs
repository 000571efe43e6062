//! Health check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// API health payload.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn api_health() -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
