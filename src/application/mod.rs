//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::MappingStore`] trait
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Request key resolution
//! - [`services::mapping_service::MappingService`] - Mapping management
//! - [`services::template_service::TemplateService`] - Compiled template cache

pub mod services;
