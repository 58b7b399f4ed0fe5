//! HTTP client for the management listener.

use crate::api::dto::{MappingDto, StatsResponse};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid management address '{0}'")]
    Address(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
}

/// Typed client for `/stats/` and `/mappings/`.
///
/// Keys are sent as a single percent-encoded path segment, so keys
/// containing `/` round-trip.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    http: Client,
    base: Url,
}

impl ManagementClient {
    /// `addr` is `host:port` or a full `http://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Address`] if the address cannot form a URL.
    pub fn new(addr: &str) -> Result<Self, ClientError> {
        let raw = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        };

        let base = Url::parse(&raw).map_err(|_| ClientError::Address(addr.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Address(addr.to_string()));
        }

        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    /// URL for `/{collection}/` or `/{collection}/{key}`.
    fn url(&self, collection: &str, key: Option<&str>) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().push(collection).push(key.unwrap_or(""));
        }
        url
    }

    async fn check(url: &Url, result: reqwest::Result<Response>) -> Result<Response, ClientError> {
        let response = result.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let response = Self::check(&url, self.http.get(url.clone()).send().await).await?;
        response
            .json()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })
    }

    pub async fn list(&self) -> Result<Vec<MappingDto>, ClientError> {
        self.get_json(self.url("mappings", None)).await
    }

    pub async fn get(&self, key: &str) -> Result<MappingDto, ClientError> {
        self.get_json(self.url("mappings", Some(key))).await
    }

    pub async fn stats(&self) -> Result<StatsResponse, ClientError> {
        self.get_json(self.url("stats", None)).await
    }

    /// Posts all mappings in one request.
    pub async fn add(&self, mappings: &[MappingDto]) -> Result<(), ClientError> {
        let url = self.url("mappings", None);
        Self::check(&url, self.http.post(url.clone()).json(mappings).send().await).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), ClientError> {
        let url = self.url("mappings", Some(key));
        Self::check(&url, self.http.delete(url.clone()).send().await).await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), ClientError> {
        let url = self.url("mappings", None);
        Self::check(&url, self.http.delete(url.clone()).send().await).await?;
        Ok(())
    }
}
