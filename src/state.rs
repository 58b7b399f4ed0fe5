use std::sync::Arc;
use std::time::Instant;

use crate::application::services::{MappingService, RedirectOptions, RedirectService, TemplateService};
use crate::config::{Config, PublicConfig};
use crate::domain::repositories::MappingStore;
use crate::utils::key_builder::{self, KeyBuilder, KeyBuilderError};

/// State shared by both listeners.
///
/// Both services hold the same store and template cache, so management
/// writes are visible to the next redirect.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService<dyn MappingStore>>,
    pub mapping_service: Arc<MappingService<dyn MappingStore>>,
    pub key_builder: Arc<dyn KeyBuilder>,
    pub public_config: Arc<PublicConfig>,
    pub started_at: Instant,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`KeyBuilderError`] if `KEY_BUILDER` is invalid.
    pub fn new(store: Arc<dyn MappingStore>, config: &Config) -> Result<Self, KeyBuilderError> {
        let key_builder = key_builder::from_config(&config.key_builder)?;
        let templates = Arc::new(TemplateService::new());

        let options = RedirectOptions {
            default_key: config.default_key.clone(),
            destination_prefix: config.destination_prefix.clone(),
            view_bag: config.view_bag.clone(),
        };

        Ok(Self {
            redirect_service: Arc::new(RedirectService::new(
                store.clone(),
                templates.clone(),
                options,
            )),
            mapping_service: Arc::new(MappingService::new(store, templates)),
            key_builder,
            public_config: Arc::new(config.public()),
            started_at: Instant::now(),
        })
    }
}
