//! Operational endpoints: liveness detail and database counts.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::error;

use super::error::{api_error, ApiError};
use crate::shared_state::AppState;
use crate::store::DatabaseStats;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub models: Vec<&'static str>,
}

/// GET /admin/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        models: state.models.loaded_models(),
    })
}

/// GET /admin/stats
pub async fn db_stats(State(state): State<AppState>) -> Result<Json<DatabaseStats>, ApiError> {
    state.database.get_stats().map(Json).map_err(|e| {
        error!("Failed to read database stats: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
    })
}
