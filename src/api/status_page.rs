//! HTML status pages for the redirect listener.
//!
//! Redirects and errors both carry a short page naming the status, rendered
//! from `templates/status.html`.

use crate::application::services::Resolution;
use crate::error::AppError;
use askama::Template;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::warn;

const HTML: &str = "text/html; charset=utf-8";

#[derive(Template)]
#[template(path = "status.html")]
struct StatusPage<'a> {
    code: u16,
    reason: &'a str,
    version: &'a str,
}

/// Renders the page body for `status`.
///
/// Falls back to `"{code} {reason}\n"` if the template fails to render.
pub fn render(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let page = StatusPage {
        code: status.as_u16(),
        reason,
        version: crate::VERSION,
    };

    page.render().unwrap_or_else(|e| {
        warn!("Failed to render status page for {}: {}", status, e);
        format!("{} {}\n", status.as_u16(), reason)
    })
}

/// A bare status page response.
pub fn status_response(status: StatusCode) -> Response {
    (status, [(header::CONTENT_TYPE, HTML)], render(status)).into_response()
}

/// Builds the 307/308 response for a resolved mapping.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the destination is not a valid header value.
pub fn redirect_response(resolution: &Resolution) -> Result<Response, AppError> {
    let location = HeaderValue::from_str(&resolution.location).map_err(|_| {
        AppError::internal(format!(
            "destination of '{}' is not a valid Location header",
            resolution.key
        ))
    })?;

    let status = resolution.status();
    Ok((
        status,
        [(header::LOCATION, location), (header::CONTENT_TYPE, HeaderValue::from_static(HTML))],
        render(status),
    )
        .into_response())
}

/// [`AppError`] rendered as an HTML status page instead of JSON.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        status_response(self.0.log())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_not_found() {
        let body = render(StatusCode::NOT_FOUND);
        assert!(body.contains("<title>404 Not Found</title>"));
        assert!(body.contains(&format!("redirector/{}", crate::VERSION)));
    }

    #[test]
    fn test_redirect_response() {
        let resolution = Resolution {
            key: "/x".to_string(),
            location: "/y".to_string(),
            permanent: true,
        };

        let response = redirect_response(&resolution).unwrap();
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/y");
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML);
    }

    #[test]
    fn test_redirect_response_rejects_bad_location() {
        let resolution = Resolution {
            key: "/x".to_string(),
            location: "/y\nSet-Cookie: a=b".to_string(),
            permanent: false,
        };

        assert!(matches!(
            redirect_response(&resolution),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_page_error_status() {
        let response = PageError(AppError::not_found("x")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], HTML);
    }
}
