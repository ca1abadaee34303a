//! # Resolver Adapter
//!
//! Binds a [`SchemaFetcher`] to one [`BaseDirectory`] and exposes it to the
//! `jsonschema` compiler as its [`Retrieve`] implementation. The compiler
//! calls it once for every external `$ref` it cannot resolve on its own;
//! schemas without external references never reach it.
//!
//! ## URI Mapping
//!
//! The compiler resolves every `$ref` to an absolute URI before retrieval.
//! The file validator anchors each root document at its base URL, so a
//! relative `$ref` under a local base arrives here as a `file://` URI and
//! one under a remote base as an `http(s)` URI. `http(s)` URIs are passed
//! through; `file://` URIs become absolute paths with percent-escapes
//! decoded, so `my%20schema.json` reads `my schema.json`. A raw space is
//! not a valid URI reference, so spaces in `$ref` values are escaped with
//! `escape_ref_spaces` before any document reaches the compiler.
//!
//! When a base has no URL form the compiler falls back to its default
//! root `json-schema:///`; such URIs are mapped back to the base-relative
//! reference (`json-schema:///defs/a.json` becomes `defs/a.json`).
//!
//! ## Runtime Bridge
//!
//! [`Retrieve::retrieve`] is synchronous. The adapter blocks on the async
//! fetcher through a captured runtime [`Handle`], so compilation must run
//! off the async workers (see `tokio::task::spawn_blocking`).

use std::sync::{Arc, OnceLock};

use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use tokio::runtime::Handle;
use url::Url;

use crate::error::FetchError;
use crate::fetch::SchemaFetcher;
use crate::location::{is_remote, BaseDirectory};

/// Root URI the compiler assigns to documents without an identifier.
const DEFAULT_ROOT_URI: &str = "json-schema:///";

/// Write-once record of the first failed retrieval in a compilation pass.
#[derive(Debug, Clone, Default)]
pub struct RetrievalFailure(Arc<OnceLock<String>>);

impl RetrievalFailure {
    /// The recorded message, if any retrieval failed.
    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }

    fn record(&self, message: String) {
        // Later failures are usually consequences of the first.
        let _ = self.0.set(message);
    }
}

/// Reference loader for one root schema.
#[derive(Debug)]
pub struct SchemaResolver {
    fetcher: SchemaFetcher,
    base: BaseDirectory,
    handle: Handle,
    failure: RetrievalFailure,
}

impl SchemaResolver {
    /// Bind `fetcher` to `base`. `handle` drives the async fetches.
    pub fn new(fetcher: SchemaFetcher, base: BaseDirectory, handle: Handle) -> Self {
        Self {
            fetcher,
            base,
            handle,
            failure: RetrievalFailure::default(),
        }
    }

    /// The base every reference is resolved against.
    pub fn base(&self) -> &BaseDirectory {
        &self.base
    }

    /// Shared view of the first retrieval failure. Stays valid after the
    /// resolver itself is moved into the compiler.
    pub fn failure(&self) -> RetrievalFailure {
        self.failure.clone()
    }

    /// Fetch the document behind `reference` against the bound base.
    pub async fn resolve(&self, reference: &str) -> Result<Value, FetchError> {
        tracing::debug!(reference, base = %self.base, "resolving schema reference");
        self.fetcher.fetch(reference, &self.base).await
    }

    /// Blocking form of [`resolve`](Self::resolve) used by the compiler.
    ///
    /// Must not be called from an async worker thread.
    pub fn resolve_blocking(&self, reference: &str) -> Result<Value, FetchError> {
        self.handle.block_on(self.resolve(reference)).map_err(|e| {
            tracing::debug!(reference, error = %e, "schema reference unresolvable");
            self.failure.record(e.to_string());
            e
        })
    }
}

impl Retrieve for SchemaResolver {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let reference = reference_for(uri.as_str());
        let mut document = self.resolve_blocking(&reference)?;
        escape_ref_spaces(&mut document);
        Ok(document)
    }
}

/// Percent-encode spaces in every `$ref` string of `document`.
pub(crate) fn escape_ref_spaces(document: &mut Value) {
    match document {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                match value {
                    Value::String(reference) if key == "$ref" && reference.contains(' ') => {
                        *reference = reference.replace(' ', "%20");
                    }
                    other => escape_ref_spaces(other),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(escape_ref_spaces),
        _ => {}
    }
}

/// Map a compiler-resolved URI back to a reference the fetcher understands.
pub(crate) fn reference_for(uri: &str) -> String {
    let uri = uri.split_once('#').map_or(uri, |(head, _)| head);

    if is_remote(uri) {
        return uri.to_string();
    }

    if let Some(relative) = uri.strip_prefix(DEFAULT_ROOT_URI) {
        return relative.to_string();
    }

    if uri.starts_with("file://") {
        if let Some(path) = Url::parse(uri).ok().and_then(|u| u.to_file_path().ok()) {
            return path.display().to_string();
        }
        return uri.trim_start_matches("file://").to_string();
    }

    uri.to_string()
}
