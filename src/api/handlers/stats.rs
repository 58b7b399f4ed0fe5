//! Handlers for runtime statistics and configuration.

use axum::{Json, extract::State};

use crate::api::dto::StatsResponse;
use crate::config::PublicConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Returns service status and store statistics.
///
/// # Endpoint
///
/// `GET /stats/`
///
/// # Response
///
/// ```json
/// {
///   "status": "OK",
///   "version": "0.1.0",
///   "uptime_seconds": 3600,
///   "database": { "total_mappings": 42, "disk_usage": 65536 }
/// }
/// ```
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let database = state.mapping_service.stats().await?;

    Ok(Json(StatsResponse {
        status: "OK".to_string(),
        version: crate::VERSION.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database,
    }))
}

/// Returns the public runtime configuration.
///
/// # Endpoint
///
/// `GET /config/`
///
/// Connection strings are masked.
pub async fn config_handler(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.public_config.as_ref().clone())
}
