//! Combined-log-format access logging.
//!
//! Lines are emitted on the `access` target so the logging setup can route
//! them to their own writer.

use axum::{
    extract::{ConnectInfo, Request},
    http::header,
    middleware::Next,
    response::Response,
};
use std::{net::SocketAddr, time::Instant};

pub const ACCESS_TARGET: &str = "access";

/// Logs one line per request after the response is produced.
///
/// ```text
/// 203.0.113.7 - - "GET /old HTTP/1.1" 308 - "-" "curl/8.5.0" 1ms
/// ```
pub async fn access_log_mw(req: Request, next: Next) -> Response {
    let start = Instant::now();

    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let version = format!("{:?}", req.version());

    let ua = header_or_dash(&req, header::USER_AGENT);
    let referer = header_or_dash(&req, header::REFERER);

    let response = next.run(req).await;

    tracing::info!(
        target: ACCESS_TARGET,
        r#"{ip} - - "{method} {path} {version}" {status} - "{referer}" "{ua}" {ms}ms"#,
        status = response.status().as_u16(),
        ms = start.elapsed().as_millis(),
    );

    response
}

fn header_or_dash(req: &Request, name: header::HeaderName) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}
