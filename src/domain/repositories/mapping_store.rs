//! Storage trait for redirect mappings.

use crate::domain::entities::Mapping;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a [`MappingStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be opened or reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be encoded or decoded.
    #[error("invalid record for key {key}: {reason}")]
    Codec { key: String, reason: String },

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The store was used after [`MappingStore::close`].
    #[error("store is closed")]
    Closed,
}

/// Aggregate store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_mappings: u64,
    /// Database file size (embedded) or server memory (remote), in bytes.
    pub disk_usage: u64,
}

/// Persistence interface for [`Mapping`]s.
///
/// Every backend must pass the same conformance suite
/// (`tests/common/mod.rs`), so callers never branch on the backend in use.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::RedbMappingStore`] - embedded file database
/// - [`crate::infrastructure::persistence::RedisMappingStore`] - remote Redis server
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Looks up a mapping by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Mapping))` if a record exists
    /// - `Ok(None)` if the key is absent or the stored payload is empty
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Codec`] if the payload cannot be decoded and
    /// [`StoreError::Backend`] on backend failures.
    async fn get(&self, key: &str) -> Result<Option<Mapping>, StoreError>;

    /// Inserts or replaces the full record for `mapping.key`.
    async fn put(&self, mapping: &Mapping) -> Result<(), StoreError>;

    /// Deletes one mapping. Returns whether a record existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Removes every mapping in one transaction and returns how many there were.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    /// Returns all mappings, unordered, read from a single snapshot.
    async fn list(&self) -> Result<Vec<Mapping>, StoreError>;

    /// Returns aggregate statistics.
    async fn stats(&self) -> Result<StoreStats, StoreError>;

    /// Releases the backend. Later calls fail with [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and `/config/`.
    fn backend(&self) -> &'static str;
}
