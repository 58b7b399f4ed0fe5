//! Mapping management service.

use std::sync::Arc;

use crate::application::services::TemplateService;
use crate::domain::entities::Mapping;
use crate::domain::repositories::{MappingStore, StoreStats};
use crate::domain::template::CompiledTemplate;
use crate::error::AppError;
use tracing::info;

/// Service behind the management endpoints.
///
/// Every write evicts the affected cached templates so the next redirect
/// recompiles from the stored destination.
pub struct MappingService<S: MappingStore + ?Sized> {
    store: Arc<S>,
    templates: Arc<TemplateService>,
}

impl<S: MappingStore + ?Sized> MappingService<S> {
    pub fn new(store: Arc<S>, templates: Arc<TemplateService>) -> Self {
        Self { store, templates }
    }

    pub async fn list(&self) -> Result<Vec<Mapping>, AppError> {
        Ok(self.store.list().await?)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key has no mapping.
    pub async fn get(&self, key: &str) -> Result<Mapping, AppError> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("no mapping for '{}'", key)))
    }

    pub async fn stats(&self) -> Result<StoreStats, AppError> {
        Ok(self.store.stats().await?)
    }

    /// Validates and stores a batch of mappings.
    ///
    /// The whole batch is validated first (including template compilation),
    /// so a bad entry rejects the request before anything is written. Each
    /// mapping is then stored in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty batch, a missing key or
    /// destination, or a destination template that does not compile. The
    /// message names the 0-based index of the offending entry.
    pub async fn create(&self, mut mappings: Vec<Mapping>) -> Result<Vec<Mapping>, AppError> {
        if mappings.is_empty() {
            return Err(AppError::bad_request("no mappings given"));
        }

        for (i, mapping) in mappings.iter_mut().enumerate() {
            mapping
                .validate()
                .map_err(|e| AppError::bad_request(format!("mapping at index {}: {}", i, e)))?;

            if mapping.is_template {
                CompiledTemplate::compile(&mapping.key, &mapping.destination).map_err(|e| {
                    AppError::bad_request(format!("mapping at index {}: {}", i, e))
                })?;
            }
        }

        for mapping in &mappings {
            self.store.put(mapping).await?;
            self.templates.invalidate(&mapping.key);
        }

        info!("Added {} mappings", mappings.len());
        Ok(mappings)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key has no mapping.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        let existed = self.store.delete(key).await?;
        self.templates.invalidate(key);

        if !existed {
            return Err(AppError::not_found(format!("no mapping for '{}'", key)));
        }

        info!("Deleted mapping {}", key);
        Ok(())
    }

    /// Deletes every mapping and returns how many there were.
    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let count = self.store.delete_all().await?;
        self.templates.clear();

        info!("Deleted {} mappings", count);
        Ok(count)
    }
}
