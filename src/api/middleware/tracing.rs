//! HTTP request/response tracing middleware.

use axum::http::Request;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Span factory tagging each request with the listener that accepted it.
#[derive(Debug, Clone, Copy)]
pub struct ListenerSpan {
    listener: &'static str,
}

impl<B> MakeSpan<B> for ListenerSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            listener = self.listener,
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}

/// Creates a tracing middleware for HTTP requests.
///
/// Errors logged by handlers land inside the request span, so they carry
/// the listener, method and URI.
///
/// # Example Logs
///
/// ```text
/// ERROR request{listener="redirect" method=GET uri=/x version=HTTP/1.1}: store backend error: ... status=500
/// DEBUG request{listener="redirect" method=GET uri=/x version=HTTP/1.1}: finished processing request latency=1 ms status=307
/// ```
pub fn layer(
    listener: &'static str,
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, ListenerSpan> {
    TraceLayer::new_for_http()
        .make_span_with(ListenerSpan { listener })
        .on_response(
            DefaultOnResponse::new()
                .level(Level::DEBUG)
                .latency_unit(LatencyUnit::Millis),
        )
}
