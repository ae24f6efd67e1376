//! Batch command implementation
//!
//! This module implements the `veracity batch` command, which:
//! - Discovers JSONL transcript files under the given paths
//! - Parses every record and resolves its domain
//! - Audits all records in parallel
//! - Prints verdicts plus a per-domain summary (human or JSONL)
//! - Returns 1 when any record was misled

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{
    EXIT_ERROR, EXIT_MISLED, EXIT_SUCCESS, build_registry, discover_files, stdout_color,
};
use crate::config::Config;
use crate::engine::{AuditEngine, BatchExecutor, BatchResult, FileWalkerError, read_transcript};
use crate::error::RuleError;
use crate::output::{HumanFormatter, JsonlFormatter};
use std::io;
use std::sync::Arc;
use termcolor::StandardStream;

/// Error type specific to the batch command
#[derive(Debug, thiserror::Error)]
enum BatchError {
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("File walker error: {0}")]
    FileWalker(#[from] FileWalkerError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Run the batch command
///
/// # Returns
///
/// Exit code:
/// - 0: No record was misled
/// - 1: At least one record was misled
/// - 2: Error (rule loading, file discovery, output)
pub fn run_batch(
    config: Config,
    paths: &[String],
    format: Option<OutputFormat>,
    jobs: Option<usize>,
    color: Option<ColorChoice>,
) -> i32 {
    let format = format.unwrap_or_else(|| config.output.format.into());
    let color = stdout_color(color, &config);

    let result = run_batch_inner(config, paths, jobs)
        .and_then(|result| print_result(&result, format, color).map(|()| result));

    match result {
        Ok(result) if result.any_misled() => EXIT_MISLED,
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn run_batch_inner(
    config: Config,
    paths: &[String],
    jobs: Option<usize>,
) -> Result<BatchResult, BatchError> {
    let registry = build_registry(&config)?;
    if registry.is_empty() {
        tracing::warn!("no domains are enabled; every record will be an audit error");
    }

    let files = discover_files(paths, &config)?;
    if files.is_empty() {
        tracing::warn!("no transcript files found");
    }

    let mut lines = Vec::new();
    let mut files_checked = 0;
    for file in &files {
        match read_transcript(file) {
            Ok(file_lines) => {
                tracing::debug!(file = %file.display(), records = file_lines.len(), "read transcript");
                lines.extend(file_lines);
                files_checked += 1;
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipping unreadable transcript");
            }
        }
    }

    let executor = BatchExecutor::new(Arc::new(AuditEngine::new(registry)), Arc::new(config));

    let result = match jobs {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(|| executor.execute(lines, files_checked)),
        None => executor.execute(lines, files_checked),
    };

    Ok(result)
}

fn print_result(
    result: &BatchResult,
    format: OutputFormat,
    color: termcolor::ColorChoice,
) -> Result<(), BatchError> {
    match format {
        OutputFormat::Human => {
            let mut stdout = StandardStream::stdout(color);
            HumanFormatter::new().write_batch(&mut stdout, result)?;
        }
        OutputFormat::Jsonl => print!("{}", JsonlFormatter::new().format_batch(result)),
    }
    Ok(())
}
