//! # File Validation
//!
//! Compiles one root schema document with the `jsonschema` crate and
//! reduces the outcome to a [`FileReport`].
//!
//! ## Outcomes
//!
//! - [`Outcome::Valid`] — the document compiled to a validator, with every
//!   external `$ref` retrieved through the [`SchemaResolver`].
//! - [`Outcome::CompileError`] — the root document is a boolean schema.
//!   `true`/`false` trivially accept or reject everything and never
//!   compile to a real validator; this is reported apart from failures.
//! - [`Outcome::Invalid`] — anything else went wrong: the root could not be
//!   read or parsed, a reference could not be fetched, or the schema does
//!   not conform to its meta-schema.
//!
//! Loading the root document goes through the same [`SchemaFetcher`] as
//! references, so a file under a remote schema root is fetched over HTTP.
//! Root load failures are reported on the file like any other failure.
//!
//! ## Anchoring
//!
//! Before compiling, the root document's identifier (`$id`, or `id` under
//! draft 4) is set to the schema root's URL, or resolved against it when
//! the document carries a relative one. Relative references, including
//! ones that climb with `..` and absolute paths, then resolve against the
//! real base instead of the compiler's opaque default root.

use std::fmt;

use jsonschema::Draft;
use serde_json::Value;
use tokio::runtime::Handle;
use url::Url;

use crate::error::FetchError;
use crate::fetch::{FetchConfig, SchemaFetcher};
use crate::location::BaseDirectory;
use crate::resolver::{escape_ref_spaces, SchemaResolver};

/// Settings shared by every file in a run.
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    /// HTTP settings for remote documents.
    pub fetch: FetchConfig,
    /// Pin compilation to one draft. `None` detects it from `$schema`.
    pub draft: Option<Draft>,
}

/// Verdict for one schema file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Compiled to a validator.
    Valid,
    /// Loading, reference retrieval or compilation failed.
    Invalid(String),
    /// Compilation produced no validator.
    CompileError(String),
}

impl Outcome {
    /// Console tag for this verdict.
    pub fn tag(&self) -> &'static str {
        match self {
            Outcome::Valid => "VALID",
            Outcome::Invalid(_) => "INVALID",
            Outcome::CompileError(_) => "ERROR",
        }
    }
}

/// Result of validating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The file as it was named on input.
    pub label: String,
    /// What happened.
    pub outcome: Outcome,
}

impl FileReport {
    fn valid(label: String) -> Self {
        Self {
            label,
            outcome: Outcome::Valid,
        }
    }

    fn invalid(label: String, message: impl Into<String>) -> Self {
        Self {
            label,
            outcome: Outcome::Invalid(message.into()),
        }
    }

    /// True only for [`Outcome::Valid`].
    pub fn ok(&self) -> bool {
        matches!(self.outcome, Outcome::Valid)
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Valid => None,
            Outcome::Invalid(m) | Outcome::CompileError(m) => Some(m),
        }
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.outcome.tag())?;
        if let Some(message) = self.message() {
            write!(f, " {message}")?;
        }
        Ok(())
    }
}

/// Validates schema files. Holds no per-file state; one instance serves a
/// whole batch and concurrent calls do not interact.
#[derive(Debug, Clone)]
pub struct FileValidator {
    fetcher: SchemaFetcher,
    draft: Option<Draft>,
}

impl FileValidator {
    /// Build a validator and its HTTP client.
    pub fn new(config: &ValidatorConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: SchemaFetcher::new(&config.fetch)?,
            draft: config.draft,
        })
    }

    /// Validate `file_path`, resolved against `schema_root`.
    ///
    /// Never fails: every problem is folded into the returned report.
    pub async fn validate_file(&self, file_path: &str, schema_root: &BaseDirectory) -> FileReport {
        let label = file_path.to_string();

        let handle = match Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                return FileReport::invalid(label, "no async runtime available for reference retrieval")
            }
        };

        let schema = match self.fetcher.fetch(file_path, schema_root).await {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(file = %label, error = %e, "root schema could not be loaded");
                return FileReport::invalid(label, e.to_string());
            }
        };

        if let Value::Bool(b) = schema {
            return FileReport {
                label,
                outcome: Outcome::CompileError(format!("failed to compile to a function: {b}")),
            };
        }

        let mut schema = anchor_to_base(schema, schema_root, self.draft);
        escape_ref_spaces(&mut schema);
        let resolver = SchemaResolver::new(self.fetcher.clone(), schema_root.clone(), handle);
        let failure = resolver.failure();
        let draft = self.draft;

        let compiled = tokio::task::spawn_blocking(move || compile(&schema, resolver, draft)).await;

        let report = match compiled {
            Ok(Ok(())) => FileReport::valid(label),
            Ok(Err(message)) => {
                // A failed retrieval surfaces as a generic compiler error;
                // report the fetch failure itself.
                let message = failure.get().map(str::to_string).unwrap_or(message);
                FileReport::invalid(label, message)
            }
            Err(e) => FileReport::invalid(label, format!("compilation aborted: {e}")),
        };

        tracing::info!(file = %report.label, verdict = report.outcome.tag(), "schema checked");
        report
    }
}

/// Give the root document an absolute identifier under `base`.
///
/// Absolute identifiers are kept. Bases that cannot be expressed as a URL
/// leave the document untouched.
fn anchor_to_base(mut schema: Value, base: &BaseDirectory, draft: Option<Draft>) -> Value {
    let Some(base_url) = base.to_url() else {
        return schema;
    };
    let key = id_keyword(&schema, draft);
    let anchored = match schema.get(key) {
        None => Some(base_url),
        Some(Value::String(id)) if Url::parse(id).is_ok() => None,
        Some(Value::String(id)) => base_url
            .join(id)
            .map_err(|e| tracing::debug!(id = %id, error = %e, "root identifier left as is"))
            .ok(),
        Some(_) => None,
    };
    if let (Some(url), Some(object)) = (anchored, schema.as_object_mut()) {
        object.insert(key.to_string(), Value::String(url.into()));
    }
    schema
}

fn id_keyword(schema: &Value, draft: Option<Draft>) -> &'static str {
    let draft4 = match draft {
        Some(draft) => matches!(draft, Draft::Draft4),
        None => schema
            .get("$schema")
            .and_then(Value::as_str)
            .is_some_and(|uri| uri.contains("draft-04")),
    };
    if draft4 {
        "id"
    } else {
        "$id"
    }
}

/// Compile `schema` with `resolver` serving external references.
fn compile(schema: &Value, resolver: SchemaResolver, draft: Option<Draft>) -> Result<(), String> {
    let mut opts = jsonschema::options();
    if let Some(draft) = draft {
        opts.with_draft(draft);
    }
    opts.with_retriever(resolver);
    opts.build(schema).map(|_| ()).map_err(|e| e.to_string())
}
