//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`MappingStore`] - Redirect mapping storage
//!
//! # Testing
//!
//! The backend conformance suite lives in `tests/common/mod.rs` and is run by
//! `tests/store_*.rs`.

pub mod mapping_store;

pub use mapping_store::{MappingStore, StoreError, StoreStats};

#[cfg(test)]
pub use mapping_store::MockMappingStore;
