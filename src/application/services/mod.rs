//! Business logic services for the application layer.

pub mod mapping_service;
pub mod redirect_service;
pub mod template_service;

pub use mapping_service::MappingService;
pub use redirect_service::{RedirectOptions, RedirectService, Resolution};
pub use template_service::TemplateService;
