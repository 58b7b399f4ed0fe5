//! HTTP layer for both listeners.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for the management API
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Tracing and access-log middleware
//! - [`routes`] - Management route configuration
//! - [`status_page`] - HTML status pages for the redirect listener

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod status_page;
