//! Application error type and its HTTP mapping.
//!
//! [`AppError`] is the single place where error kinds become status codes.
//! The management listener renders it as JSON through [`IntoResponse`]; the
//! redirect listener wraps it in [`crate::api::status_page::PageError`] to
//! render an HTML status page instead.

use crate::domain::entities::MappingError;
use crate::domain::repositories::StoreError;
use crate::domain::template::TemplateError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    status: u16,
    message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("query parameter '{param}' is missing or empty")]
    KeyParameterMissing { param: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::KeyParameterMissing { .. } => StatusCode::NOT_FOUND,
            Self::Template(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the error is the server's fault rather than the client's.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Logs the error at a level matching its class and returns its status.
    pub fn log(&self) -> StatusCode {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }
        status
    }
}

impl From<MappingError> for AppError {
    fn from(e: MappingError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.log();

        let body = ErrorBody {
            error: ErrorInfo {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown"),
            },
        };

        (status, Json(body)).into_response()
    }
}
