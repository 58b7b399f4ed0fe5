//! Handler for redirect requests.

use axum::{
    extract::State,
    http::{HeaderMap, Uri, header},
    response::Response,
};
use tracing::debug;

use crate::api::status_page::{PageError, redirect_response};
use crate::domain::template::ViewBag;
use crate::state::AppState;

/// Redirects any request to the destination of its mapping.
///
/// # Endpoint
///
/// Any method and path on the redirect listener.
///
/// # Request Flow
///
/// 1. Derive the lookup key with the configured key builder
/// 2. Look up the key, then the default key
/// 3. Render template destinations against the request
/// 4. Return 307 Temporary or 308 Permanent Redirect
///
/// # Errors
///
/// Every error renders an HTML status page: 404 Not Found when no mapping
/// matches, 500 Internal Server Error for storage or template failures.
pub async fn redirect_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let requested = state.key_builder.build_key(&uri, &headers);
    let bag = request_view_bag(&uri, &headers);

    let resolution = state.redirect_service.resolve(requested, bag).await?;
    debug!(
        "Resolved {} via {} -> {}",
        uri, resolution.key, resolution.location
    );

    Ok(redirect_response(&resolution)?)
}

/// Request-derived template values: `Path`, `Query` and `Host`.
fn request_view_bag(uri: &Uri, headers: &HeaderMap) -> ViewBag {
    let host = uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
        .unwrap_or_default();

    ViewBag::new()
        .with("Path", uri.path())
        .with("Query", uri.query().unwrap_or_default())
        .with("Host", host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_view_bag() {
        let uri: Uri = "/a/b?x=1".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));

        let bag = request_view_bag(&uri, &headers);
        assert_eq!(bag.get("Path"), Some("/a/b"));
        assert_eq!(bag.get("Query"), Some("x=1"));
        assert_eq!(bag.get("Host"), Some("example.com"));
    }

    #[test]
    fn test_request_view_bag_without_host() {
        let uri: Uri = "/".parse().unwrap();
        let bag = request_view_bag(&uri, &HeaderMap::new());

        assert_eq!(bag.get("Query"), Some(""));
        assert_eq!(bag.get("Host"), Some(""));
    }
}
