//! HTTP middleware for request processing and observability.

pub mod access_log;
pub mod tracing;
