//! # Schema Fetcher
//!
//! Retrieves the document behind a `$ref` and parses it as JSON.
//!
//! ## Resolution Policy
//!
//! Evaluated in order:
//!
//! 1. A remote reference is fetched with a GET to exactly that URL; the
//!    base is ignored.
//! 2. A local reference under a remote base is joined onto the base URL
//!    and fetched with a GET.
//! 3. A local reference under a local base is read from
//!    `<base>/<reference>`.
//!
//! Responses are parsed as JSON whatever their declared content type. A
//! status of 400 or above is a [`FetchError::Loading`]. Nothing is retried
//! and nothing is cached: fetching the same reference twice issues two
//! requests.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::FetchError;
use crate::location::{BaseDirectory, Location};

/// HTTP settings for remote fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// `User-Agent` header sent with every GET.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: concat!("jsv/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches schema documents from local files or HTTP origins.
///
/// Holds no per-request state, so one fetcher can serve any number of
/// concurrent fetches. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SchemaFetcher {
    client: reqwest::Client,
}

impl SchemaFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Fetch and parse the document behind `uri`, resolving it against `base`.
    pub async fn fetch(&self, uri: &str, base: &BaseDirectory) -> Result<Value, FetchError> {
        match (Location::classify(uri), base.location()) {
            (Location::Remote { url }, _) => self.get(parse_url(&url)?).await,
            (Location::Local { .. }, Location::Remote { url: base_url }) => {
                let target = join_url(base_url, uri)?;
                self.get(target).await
            }
            (Location::Local { path }, Location::Local { path: dir }) => {
                read_local(&dir.join(path)).await
            }
        }
    }

    async fn get(&self, url: Url) -> Result<Value, FetchError> {
        let uri = url.to_string();
        tracing::debug!(uri = %uri, "fetching remote schema");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                uri: uri.clone(),
                source,
            })?;

        let status = resp.status().as_u16();
        if status >= 400 {
            tracing::debug!(uri = %uri, status, "remote schema fetch rejected");
            return Err(FetchError::Loading { uri, status });
        }

        let body = resp.bytes().await.map_err(|source| FetchError::Http {
            uri: uri.clone(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Parse {
            origin: uri,
            source,
        })
    }
}

/// Read and parse a local schema file.
pub(crate) async fn read_local(path: &Path) -> Result<Value, FetchError> {
    let origin = path.display().to_string();
    tracing::debug!(path = %origin, "reading local schema");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FetchError::Io {
            path: origin.clone(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| FetchError::Parse { origin, source })
}

fn parse_url(uri: &str) -> Result<Url, FetchError> {
    Url::parse(uri).map_err(|e| FetchError::InvalidUrl {
        uri: uri.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve a relative reference against a remote base URL.
pub(crate) fn join_url(base_url: &str, reference: &str) -> Result<Url, FetchError> {
    parse_url(base_url)?
        .join(reference)
        .map_err(|e| FetchError::InvalidUrl {
            uri: reference.to_string(),
            reason: e.to_string(),
        })
}
