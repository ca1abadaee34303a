//! # jsv CLI entry point
//!
//! Parses command-line arguments, initializes tracing and the async
//! runtime, and hands off to the validate command.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use jsv_cli::validate::{run_validate, ValidateArgs};

/// Validate JSON Schema files.
///
/// Compiles every file matched by `--files`, fetching external `$ref`s from
/// the local filesystem or over HTTP, and exits with status 1 if any file
/// fails to compile.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    validate: ValidateArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("jsv starting");

    ExitCode::from(exit_status(run_validate(&cli.validate).await))
}

/// Map the command result to a process exit status, logging a failure once.
fn exit_status(result: anyhow::Result<u8>) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            1
        }
    }
}
