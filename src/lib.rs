//! # redirector
//!
//! An HTTP redirect service that maps request keys to destination URLs,
//! backed by an embedded redb file or a Redis server.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Mapping entity, store trait, destination templates
//! - **Application Layer** ([`application`]) - Resolution, management and template caching
//! - **Infrastructure Layer** ([`infrastructure`]) - redb and Redis stores, management client
//! - **API Layer** ([`api`]) - Handlers, DTOs, middleware and status pages
//!
//! ## Features
//!
//! - Path, full-URI or query-parameter lookup keys
//! - Default-key fallback for unknown requests
//! - Per-request destination templates (`{{ .Key }}`)
//! - Separate management listener with a JSON API and an admin CLI
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_PATH="./redirector.redb"
//! cargo run
//!
//! cargo run --bin redirector-admin -- add --key /old --dest https://example.com/new
//! curl -i http://localhost:8080/old
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod logging;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Version reported on `/stats/`, `/config/` and status pages.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{MappingService, RedirectService, TemplateService};
    pub use crate::domain::entities::Mapping;
    pub use crate::domain::repositories::{MappingStore, StoreError, StoreStats};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
