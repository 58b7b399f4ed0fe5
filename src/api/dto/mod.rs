//! Data Transfer Objects for the management API.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation.

pub mod mapping;
pub mod stats;

pub use mapping::{MappingDto, MappingPayload};
pub use stats::StatsResponse;
