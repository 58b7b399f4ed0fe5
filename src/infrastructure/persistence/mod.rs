//! Mapping store implementations.
//!
//! Concrete implementations of [`crate::domain::repositories::MappingStore`].
//!
//! # Stores
//!
//! - [`RedbMappingStore`] - Embedded redb database file
//! - [`RedisMappingStore`] - Remote Redis server
//!
//! Both share the record format in [`codec`].

pub mod codec;
pub mod redb_mapping_store;
pub mod redis_mapping_store;

pub use redb_mapping_store::RedbMappingStore;
pub use redis_mapping_store::RedisMappingStore;

use crate::config::{Config, DatabaseDriver};
use crate::domain::repositories::{MappingStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Opens the store selected by the configuration.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] if the backend cannot be opened.
pub async fn open_store(config: &Config) -> Result<Arc<dyn MappingStore>, StoreError> {
    let timeout = Duration::from_secs(config.db_connect_timeout);

    let store: Arc<dyn MappingStore> = match config.database_driver {
        DatabaseDriver::Redb => Arc::new(RedbMappingStore::open(&config.database_path, timeout).await?),
        DatabaseDriver::Redis => {
            Arc::new(RedisMappingStore::connect(&config.database_path, timeout).await?)
        }
    };

    Ok(store)
}
