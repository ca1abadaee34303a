//! # jsv-schema — Schema Reference Resolution
//!
//! Compiles JSON Schema documents with the `jsonschema` crate while
//! resolving external `$ref` targets from the local filesystem or over
//! HTTP, and reduces each file to a pass/fail report.
//!
//! ## Components
//!
//! - [`location`] — classifies a reference or base as remote (HTTP/HTTPS)
//!   or local. Classification happens once, where a string enters the
//!   system.
//! - [`fetch`] — [`SchemaFetcher`] retrieves and parses a referenced
//!   document from the right origin.
//! - [`resolver`] — [`SchemaResolver`] binds a fetcher to one base and is
//!   handed to the compiler as its retriever.
//! - [`validate`] — [`FileValidator`] loads a root schema, compiles it with
//!   the resolver, and produces a [`FileReport`].
//!
//! ## Crate Policy
//!
//! - Fetch failures are never retried and never cached.
//! - Every failure after a file's validation starts is reported on that
//!   file's [`FileReport`]; nothing here aborts a batch.
//! - No schema document is mutated after it is handed to the compiler.

pub mod error;
pub mod fetch;
pub mod location;
pub mod resolver;
pub mod validate;

pub use error::FetchError;
pub use fetch::{FetchConfig, SchemaFetcher};
pub use location::{BaseDirectory, Location};
pub use resolver::SchemaResolver;
pub use validate::{FileReport, FileValidator, Outcome, ValidatorConfig};
