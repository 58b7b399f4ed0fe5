//! Top-level router configuration for both listeners.
//!
//! # Listeners
//!
//! - **Redirect** - every method and path resolves a mapping
//! - **Management** - JSON API under `/stats/`, `/config/` and `/mappings/`
//!
//! # Middleware
//!
//! - **Tracing** - Request span tagged with the listener name
//! - **Access log** - One combined-log-format line per request
//! - **Security headers** - `X-Content-Type-Options: nosniff` on every response

use crate::api;
use crate::api::handlers::redirect_handler;
use crate::api::middleware::{access_log::access_log_mw, tracing};
use crate::state::AppState;
use axum::http::{HeaderValue, header};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

fn nosniff() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    )
}

/// Router for the public redirect listener.
pub fn redirect_router(state: AppState) -> Router {
    Router::new()
        .fallback(redirect_handler)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(nosniff())
                .layer(tracing::layer("redirect"))
                .layer(middleware::from_fn(access_log_mw)),
        )
}

/// Router for the management listener.
pub fn management_router(state: AppState) -> Router {
    api::routes::management_routes()
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(nosniff())
                .layer(tracing::layer("management"))
                .layer(middleware::from_fn(access_log_mw)),
        )
}
