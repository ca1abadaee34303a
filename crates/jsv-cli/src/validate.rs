//! # Validate Command
//!
//! Glob expansion, concurrent validation, report, exit code.
//!
//! Exit codes: 0 when every matched file compiles, 1 on an invalid glob,
//! on zero matches, or when at least one file is invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use jsonschema::Draft;

use jsv_schema::{BaseDirectory, FetchConfig, FileValidator, ValidatorConfig};

use crate::batch::{expand_files, run_batch};
use crate::report;

/// Arguments for schema validation.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Glob of files to validate.
    #[arg(short = 'f', long = "files", value_name = "GLOB")]
    pub files: String,

    /// Schema root directory or URL, used as base for search and for
    /// resolving refs. Defaults to the current directory.
    #[arg(short = 'r', long = "root", visible_alias = "rootDir", value_name = "PATH|URL")]
    pub root: Option<String>,

    /// Compile every schema under this draft instead of detecting it from
    /// `$schema` (4, 6, 7, 2019-09, 2020-12).
    #[arg(long, value_name = "DRAFT", value_parser = parse_draft)]
    pub draft: Option<Draft>,

    /// Give up on a remote fetch after this many seconds. Waits
    /// indefinitely when unset.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl ValidateArgs {
    /// The schema root, classified once.
    pub fn schema_root(&self) -> BaseDirectory {
        match &self.root {
            Some(root) => BaseDirectory::new(root),
            None => BaseDirectory::current_dir(),
        }
    }

    /// Validator settings derived from the flags.
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            fetch: FetchConfig {
                timeout: self.timeout_secs.map(Duration::from_secs),
                ..FetchConfig::default()
            },
            draft: self.draft,
        }
    }
}

/// Parse a `--draft` value.
pub fn parse_draft(raw: &str) -> Result<Draft, String> {
    match raw.trim_start_matches("draft").trim_start_matches('-') {
        "4" | "04" => Ok(Draft::Draft4),
        "6" | "06" => Ok(Draft::Draft6),
        "7" | "07" => Ok(Draft::Draft7),
        "2019-09" | "201909" => Ok(Draft::Draft201909),
        "2020-12" | "202012" => Ok(Draft::Draft202012),
        other => Err(format!(
            "unknown draft '{other}'; expected one of 4, 6, 7, 2019-09, 2020-12"
        )),
    }
}

/// Execute the validate command and return the process exit code.
pub async fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let root = args.schema_root();
    report::search_banner(&args.files, &root);

    let files = match expand_files(&args.files, &root) {
        Ok(files) => files,
        Err(e) => {
            tracing::debug!(error = %e, "glob expansion ended the run");
            report::fatal(&e);
            return Ok(1);
        }
    };

    let validator =
        FileValidator::new(&args.validator_config()).context("failed to set up schema fetcher")?;

    let summary = run_batch(&validator, &files, &root).await;
    report::summary(&summary);

    tracing::info!(
        total = summary.reports.len(),
        valid = summary.valid_count(),
        "validation finished"
    );

    Ok(summary.exit_code())
}
