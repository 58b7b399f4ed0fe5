//! Compiled template cache keyed by mapping key.

use crate::domain::template::{CompiledTemplate, TemplateError, ViewBag};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Compiles destination templates on first use and caches them.
///
/// A cached entry is reused only while its source matches the destination
/// being rendered, so a mapping rewritten through another process is
/// recompiled on the next request. Local writes also evict entries through
/// [`TemplateService::invalidate`].
#[derive(Debug, Default)]
pub struct TemplateService {
    cache: Mutex<HashMap<String, Arc<CompiledTemplate>>>,
}

impl TemplateService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled template for `key`, compiling `source` on a miss.
    ///
    /// Compilation happens outside the lock. When two requests compile the
    /// same key concurrently, the first insert wins and both use it.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if `source` does not parse.
    pub fn get_or_compile(
        &self,
        key: &str,
        source: &str,
    ) -> Result<Arc<CompiledTemplate>, TemplateError> {
        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(tmpl) = cache.get(key)
                && tmpl.source() == source
            {
                return Ok(tmpl.clone());
            }
        }

        debug!("Compiling template for {}", key);
        let compiled = Arc::new(CompiledTemplate::compile(key, source)?);

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = cache
            .entry(key.to_string())
            .and_modify(|existing| {
                if existing.source() != source {
                    *existing = compiled.clone();
                }
            })
            .or_insert(compiled);

        Ok(entry.clone())
    }

    /// Renders the destination of `key` against `bag`.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if compiling or rendering fails.
    pub fn render(&self, key: &str, source: &str, bag: &ViewBag) -> Result<String, TemplateError> {
        self.get_or_compile(key, source)?.render(bag)
    }

    /// Drops the cached template for `key`.
    pub fn invalidate(&self, key: &str) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Drops every cached template.
    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
