//! Request key resolution.

use std::sync::Arc;

use crate::application::services::TemplateService;
use crate::domain::repositories::MappingStore;
use crate::domain::template::ViewBag;
use crate::error::AppError;
use axum::http::StatusCode;
use tracing::{debug, warn};

/// Operator settings that shape resolution.
#[derive(Debug, Clone, Default)]
pub struct RedirectOptions {
    /// Mapping used when the requested key has none.
    pub default_key: Option<String>,
    /// Prepended to every computed destination.
    pub destination_prefix: Option<String>,
    /// Values available to every destination template.
    pub view_bag: ViewBag,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Key of the mapping that matched (the requested key or the default key).
    pub key: String,
    pub location: String,
    pub permanent: bool,
}

impl Resolution {
    /// 308 for permanent mappings, 307 otherwise.
    pub fn status(&self) -> StatusCode {
        if self.permanent {
            StatusCode::PERMANENT_REDIRECT
        } else {
            StatusCode::TEMPORARY_REDIRECT
        }
    }
}

/// Turns an extracted request key into a redirect target.
///
/// # Resolution order
///
/// 1. The requested key, unless extraction failed or produced nothing
/// 2. The configured default key, if set and different
///
/// The first valid mapping wins. Template destinations are rendered with the
/// operator view bag, the request values and `Key` set to the requested key.
pub struct RedirectService<S: MappingStore + ?Sized> {
    store: Arc<S>,
    templates: Arc<TemplateService>,
    options: RedirectOptions,
}

impl<S: MappingStore + ?Sized> RedirectService<S> {
    pub fn new(store: Arc<S>, templates: Arc<TemplateService>, options: RedirectOptions) -> Self {
        Self {
            store,
            templates,
            options,
        }
    }

    /// Resolves a request.
    ///
    /// `requested` is the key builder's result. A client-class extraction
    /// error does not stop resolution, so the default key can still apply; it
    /// is returned only if no candidate matches.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] or the recorded extraction error if nothing matches
    /// - [`AppError::Store`] on storage failures
    /// - [`AppError::Template`] if a template destination cannot be rendered
    pub async fn resolve(
        &self,
        requested: Result<String, AppError>,
        request_bag: ViewBag,
    ) -> Result<Resolution, AppError> {
        let (requested, extraction_error) = match requested {
            Ok(key) => (key, None),
            Err(e) if e.is_server_error() => return Err(e),
            Err(e) => {
                debug!("Key extraction failed, trying default key: {}", e);
                (String::new(), Some(e))
            }
        };

        let mut candidates = Vec::with_capacity(2);
        if !requested.is_empty() {
            candidates.push(requested.as_str());
        }
        if let Some(default_key) = self.options.default_key.as_deref()
            && !default_key.is_empty()
            && default_key != requested
        {
            candidates.push(default_key);
        }

        let mut found = None;
        for candidate in candidates {
            let Some(mut mapping) = self.store.get(candidate).await? else {
                debug!("No mapping for {}", candidate);
                continue;
            };

            match mapping.validate() {
                Ok(()) => {
                    found = Some(mapping);
                    break;
                }
                Err(e) => warn!("Ignoring invalid mapping {}: {}", candidate, e),
            }
        }

        let Some(mapping) = found else {
            return Err(extraction_error
                .unwrap_or_else(|| AppError::not_found(format!("no mapping for '{}'", requested))));
        };

        let destination = if mapping.is_template {
            let mut bag = self.options.view_bag.clone();
            bag.extend_from(&request_bag);
            bag.insert("Key", requested.as_str());

            self.templates
                .render(&mapping.key, &mapping.destination, &bag)?
        } else {
            mapping.destination
        };

        let location = match self.options.destination_prefix.as_deref() {
            Some(prefix) => format!("{}{}", prefix, destination),
            None => destination,
        };

        Ok(Resolution {
            key: mapping.key,
            location,
            permanent: mapping.permanent,
        })
    }
}
