//! Management API route configuration.
//!
//! The management listener has no authentication; bind it to a private
//! address.

use crate::api::handlers::{
    config_handler, create_mappings_handler, delete_all_mappings_handler, delete_mapping_handler,
    get_mapping_handler, list_mappings_handler, stats_handler,
};
use crate::error::AppError;
use crate::state::AppState;
use axum::{Router, routing::get};

/// All management routes.
///
/// # Endpoints
///
/// - `GET    /stats/`          - Service status and store statistics
/// - `GET    /config/`         - Public runtime configuration
/// - `GET    /mappings/`       - List all mappings
/// - `POST   /mappings/`       - Create one or many mappings
/// - `DELETE /mappings/`       - Delete all mappings
/// - `GET    /mappings/{key}`  - Fetch one mapping
/// - `DELETE /mappings/{key}`  - Delete one mapping
pub fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/", get(stats_handler))
        .route("/config/", get(config_handler))
        .route(
            "/mappings/",
            get(list_mappings_handler)
                .post(create_mappings_handler)
                .delete(delete_all_mappings_handler),
        )
        .route(
            "/mappings/{*key}",
            get(get_mapping_handler).delete(delete_mapping_handler),
        )
        .fallback(|| async { AppError::not_found("no such endpoint") })
}
