//! Lookup key derivation from HTTP requests.
//!
//! The strategy is chosen once at startup from `KEY_BUILDER`:
//!
//! - `path` - the request path, verbatim
//! - `uri` - `scheme://host/path?query`
//! - `param:<name>` - the value of one query parameter

use crate::AppError;
use axum::http::{HeaderMap, Uri, header};
use std::sync::Arc;
use thiserror::Error;

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Placeholder host used when a request carries no host information.
pub const UNKNOWN_HOST: &str = ".";

/// Rejected `KEY_BUILDER` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyBuilderError {
    #[error("unknown key builder '{0}', expected 'path', 'uri' or 'param:<name>'")]
    Unknown(String),

    #[error("key builder 'param:' needs a parameter name")]
    EmptyParam,
}

/// Derives the store lookup key from a request.
pub trait KeyBuilder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::KeyParameterMissing`] when the request lacks the
    /// information the strategy needs.
    fn build_key(&self, uri: &Uri, headers: &HeaderMap) -> Result<String, AppError>;

    /// The configuration string this builder was created from.
    fn name(&self) -> String;
}

/// Uses the request path as the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathKeyBuilder;

impl KeyBuilder for PathKeyBuilder {
    fn build_key(&self, uri: &Uri, _headers: &HeaderMap) -> Result<String, AppError> {
        Ok(uri.path().to_string())
    }

    fn name(&self) -> String {
        "path".to_string()
    }
}

/// Uses the full request URI as the key, reconstructing scheme and host from
/// proxy headers when the request line is in origin form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriKeyBuilder;

impl KeyBuilder for UriKeyBuilder {
    fn build_key(&self, uri: &Uri, headers: &HeaderMap) -> Result<String, AppError> {
        let scheme = uri
            .scheme_str()
            .map(str::to_string)
            .or_else(|| first_value(headers, FORWARDED_PROTO))
            .unwrap_or_else(|| "http".to_string());

        let host = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| first_value(headers, FORWARDED_HOST))
            .or_else(|| first_value(headers, header::HOST.as_str()))
            .unwrap_or_else(|| UNKNOWN_HOST.to_string());

        let mut key = format!("{}://{}{}", scheme, host, uri.path());
        if let Some(query) = uri.query() {
            key.push('?');
            key.push_str(query);
        }

        Ok(key)
    }

    fn name(&self) -> String {
        "uri".to_string()
    }
}

/// Uses one query parameter as the key.
#[derive(Debug, Clone)]
pub struct ParamKeyBuilder {
    param: String,
}

impl ParamKeyBuilder {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl KeyBuilder for ParamKeyBuilder {
    fn build_key(&self, uri: &Uri, _headers: &HeaderMap) -> Result<String, AppError> {
        uri.query()
            .and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(name, _)| name == self.param.as_str())
                    .map(|(_, value)| value.into_owned())
            })
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::KeyParameterMissing {
                param: self.param.clone(),
            })
    }

    fn name(&self) -> String {
        format!("param:{}", self.param)
    }
}

/// Builds the strategy named by a `KEY_BUILDER` value.
///
/// # Errors
///
/// Returns [`KeyBuilderError`] for unknown names or an empty parameter.
pub fn from_config(selector: &str) -> Result<Arc<dyn KeyBuilder>, KeyBuilderError> {
    match selector {
        "path" => Ok(Arc::new(PathKeyBuilder)),
        "uri" => Ok(Arc::new(UriKeyBuilder)),
        other => match other.strip_prefix("param:") {
            Some("") => Err(KeyBuilderError::EmptyParam),
            Some(param) => Ok(Arc::new(ParamKeyBuilder::new(param))),
            None => Err(KeyBuilderError::Unknown(other.to_string())),
        },
    }
}

/// First comma-separated value of a header, trimmed.
fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
