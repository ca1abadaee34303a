//! # Console Report
//!
//! Human-readable output. Valid files go to stdout; failures, the search
//! banner and the final verdict go to stderr. The format is for people,
//! not for machines.

use colored::Colorize;

use jsv_schema::{BaseDirectory, FileReport, Outcome};

use crate::batch::{BatchError, BatchSummary};

/// Announce what is being searched.
pub fn search_banner(pattern: &str, root: &BaseDirectory) {
    eprintln!("Search for files matching {pattern} in {root}");
}

/// Report a batch-level failure.
pub fn fatal(err: &BatchError) {
    match err {
        BatchError::NoMatch { .. } => eprintln!("{} {err}", "ERROR".bright_red()),
        _ => eprintln!("{err}"),
    }
}

/// Print one line for a file.
pub fn file_line(report: &FileReport) {
    match &report.outcome {
        Outcome::Valid => println!("{} {}", report.label, "VALID".green()),
        Outcome::Invalid(message) => {
            eprintln!("{} {} {message}", report.label, "INVALID".bright_red())
        }
        Outcome::CompileError(message) => {
            eprintln!("{} {} {message}", report.label, "ERROR".red())
        }
    }
}

/// Print every file line, then the aggregate verdict.
pub fn summary(summary: &BatchSummary) {
    for report in &summary.reports {
        file_line(report);
    }
    if summary.all_valid() {
        eprintln!("{}", "All files were valid".green());
    } else {
        eprintln!("{}", "Some files were invalid".bright_red());
    }
}
