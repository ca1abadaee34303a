//! # Batch Runner
//!
//! Expands the `--files` glob under the schema root and validates every
//! match concurrently. The join is all-settle: every file runs to
//! completion and reports, whatever happens to the others.

use std::path::Path;

use futures::future::join_all;
use thiserror::Error;

use jsv_schema::{BaseDirectory, FileReport, FileValidator, Location};

/// Failures that end a run before any file is validated.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The glob pattern does not parse.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        /// Pattern as given.
        pattern: String,
        /// Parser failure.
        source: glob::PatternError,
    },

    /// A directory could not be read while expanding the glob.
    #[error("glob expansion failed: {0}")]
    Walk(#[from] glob::GlobError),

    /// The local root cannot be embedded in a glob pattern.
    #[error("schema root is not valid UTF-8: {path}")]
    NonUtf8Root {
        /// Lossy rendering of the root.
        path: String,
    },

    /// Wildcards cannot be expanded against an HTTP root.
    #[error("cannot expand glob '{pattern}' against remote root {root}")]
    RemoteGlob {
        /// Pattern as given.
        pattern: String,
        /// The remote root.
        root: String,
    },

    /// Nothing matched.
    #[error("No matching files found")]
    NoMatch {
        /// Pattern as given.
        pattern: String,
    },
}

/// Verdicts for every file of a run, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// One report per file.
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    /// True when every file compiled.
    pub fn all_valid(&self) -> bool {
        self.reports.iter().all(FileReport::ok)
    }

    /// Number of valid files.
    pub fn valid_count(&self) -> usize {
        self.reports.iter().filter(|r| r.ok()).count()
    }

    /// Reports that are not valid.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| !r.ok())
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> u8 {
        if self.all_valid() {
            0
        } else {
            1
        }
    }
}

/// List the files `pattern` selects under `root`.
///
/// Under a local root the pattern is matched relative to the root, only
/// regular files are kept, and labels are root-relative and sorted. A
/// remote root cannot be listed, so the pattern must name exactly one file
/// and is returned as is.
pub fn expand_files(pattern: &str, root: &BaseDirectory) -> Result<Vec<String>, BatchError> {
    let dir = match root.location() {
        Location::Remote { url } => {
            if has_glob_meta(pattern) {
                return Err(BatchError::RemoteGlob {
                    pattern: pattern.to_string(),
                    root: url.clone(),
                });
            }
            return Ok(vec![pattern.to_string()]);
        }
        Location::Local { path } => path,
    };

    let full_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let dir_str = dir.to_str().ok_or_else(|| BatchError::NonUtf8Root {
            path: dir.display().to_string(),
        })?;
        format!(
            "{}/{}",
            glob::Pattern::escape(dir_str.trim_end_matches('/')),
            pattern
        )
    };
    tracing::debug!(pattern = %full_pattern, "expanding glob");

    let entries = glob::glob(&full_pattern).map_err(|source| BatchError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        let label = path.strip_prefix(dir).unwrap_or(&path);
        files.push(label.display().to_string());
    }

    if files.is_empty() {
        return Err(BatchError::NoMatch {
            pattern: pattern.to_string(),
        });
    }

    files.sort();
    Ok(files)
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']'])
}

/// Validate every file concurrently and wait for all of them.
pub async fn run_batch(
    validator: &FileValidator,
    files: &[String],
    root: &BaseDirectory,
) -> BatchSummary {
    tracing::info!(count = files.len(), root = %root, "validating schema files");
    let reports = join_all(files.iter().map(|f| validator.validate_file(f, root))).await;
    BatchSummary { reports }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_schema::ValidatorConfig;

    fn touch(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn expands_relative_to_root_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.json", "{}");
        touch(dir.path(), "a.json", "{}");
        touch(dir.path(), "notes.txt", "");

        let files = expand_files("*.json", &BaseDirectory::local(dir.path())).unwrap();
        assert_eq!(files, vec!["a.json", "b.json"]);
    }

    #[test]
    fn recursive_glob_keeps_subdirectories_in_labels() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "top.json", "{}");
        touch(dir.path(), "nested/deep/inner.json", "{}");

        let files = expand_files("**/*.json", &BaseDirectory::local(dir.path())).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&"top.json".to_string()));
        assert!(files
            .iter()
            .any(|f| Path::new(f) == Path::new("nested/deep/inner.json")));
    }

    #[test]
    fn directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder.json")).unwrap();
        touch(dir.path(), "file.json", "{}");

        let files = expand_files("*.json", &BaseDirectory::local(dir.path())).unwrap();
        assert_eq!(files, vec!["file.json"]);
    }

    #[test]
    fn no_match_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_files("*.json", &BaseDirectory::local(dir.path())).unwrap_err();
        assert!(matches!(err, BatchError::NoMatch { .. }));
        assert_eq!(err.to_string(), "No matching files found");
    }

    #[test]
    fn bad_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_files("[*.json", &BaseDirectory::local(dir.path())).unwrap_err();
        assert!(matches!(err, BatchError::Pattern { .. }), "got {err}");
    }

    #[test]
    fn root_with_glob_metacharacters_is_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("[v1]");
        touch(&odd, "s.json", "{}");

        let files = expand_files("*.json", &BaseDirectory::local(&odd)).unwrap();
        assert_eq!(files, vec!["s.json"]);
    }

    #[test]
    fn remote_root_takes_pattern_literally() {
        let root = BaseDirectory::new("https://schemas.example.com/v1");
        assert_eq!(
            expand_files("root.json", &root).unwrap(),
            vec!["root.json".to_string()]
        );

        let err = expand_files("*.json", &root).unwrap_err();
        assert!(matches!(err, BatchError::RemoteGlob { .. }));
    }

    #[test]
    fn summary_exit_code_reflects_any_failure() {
        let ok = FileReport {
            label: "a.json".into(),
            outcome: jsv_schema::Outcome::Valid,
        };
        let bad = FileReport {
            label: "b.json".into(),
            outcome: jsv_schema::Outcome::CompileError("failed".into()),
        };

        let summary = BatchSummary {
            reports: vec![ok.clone()],
        };
        assert!(summary.all_valid());
        assert_eq!(summary.exit_code(), 0);

        let summary = BatchSummary {
            reports: vec![ok, bad],
        };
        assert!(!summary.all_valid());
        assert_eq!(summary.valid_count(), 1);
        assert_eq!(summary.failures().count(), 1);
        assert_eq!(summary.exit_code(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn batch_reports_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "one.json", r#"{"type":"string"}"#);
        touch(dir.path(), "two.json", r#"{"$ref":"missing.json"}"#);
        touch(dir.path(), "three.json", r#"{"type":"number"}"#);

        let root = BaseDirectory::local(dir.path());
        let files: Vec<String> = ["one.json", "two.json", "three.json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let validator = FileValidator::new(&ValidatorConfig::default()).unwrap();

        let summary = run_batch(&validator, &files, &root).await;
        let labels: Vec<&str> = summary.reports.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, files);
        assert!(summary.reports[0].ok());
        assert!(!summary.reports[1].ok());
        assert!(summary.reports[2].ok());
    }
}
