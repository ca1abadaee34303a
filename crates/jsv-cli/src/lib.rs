//! # jsv-cli — JSON Schema Validation CLI
//!
//! Provides the `jsv` command: expand a glob of schema files under a root,
//! compile every match concurrently with external `$ref`s resolved from
//! disk or HTTP, print one verdict per file, and exit non-zero if any file
//! failed.
//!
//! ```bash
//! jsv --files 'schemas/**/*.json'
//! jsv -f '*.schema.json' --root ./contracts
//! jsv -f root.json --root https://schemas.example.com/v1/
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing and console output live here; resolution and
//!   compilation live in `jsv-schema`.
//! - Batch-level failures (bad glob, no matches) end the run before any
//!   file is validated. Per-file failures only affect the exit code.

pub mod batch;
pub mod report;
pub mod validate;

pub use batch::{expand_files, run_batch, BatchError, BatchSummary};
pub use validate::{run_validate, ValidateArgs};
