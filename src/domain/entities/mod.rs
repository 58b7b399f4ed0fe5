//! Core domain entities.
//!
//! - [`Mapping`] - A redirect from a request key to a destination URL

pub mod mapping;

pub use mapping::{Mapping, MappingError, TEMPLATE_MARKER};
