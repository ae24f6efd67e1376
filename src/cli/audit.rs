//! Audit command implementation
//!
//! This module implements the `veracity audit` command, which:
//! - Builds the rule registry from configuration
//! - Reads one reply from `--text`, `--file` or stdin
//! - Audits it against a single domain
//! - Prints the verdict and maps it to an exit code

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{EXIT_ERROR, EXIT_MISLED, EXIT_SUCCESS, build_registry, stdout_color};
use crate::config::Config;
use crate::engine::{AuditEngine, AuditResult, AuditStatus};
use crate::error::{AuditError, RuleError};
use crate::output::{HumanFormatter, JsonlFormatter};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use termcolor::StandardStream;

/// Error type specific to the audit command
#[derive(Debug, thiserror::Error)]
enum AuditCommandError {
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("{0}")]
    Audit(#[from] AuditError),

    #[error("Failed to read {path}: {source}")]
    ReadInput { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where the reply text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Text(String),
    File(PathBuf),
    Stdin,
}

impl ReplySource {
    pub fn from_args(text: Option<String>, file: Option<PathBuf>) -> Self {
        match (text, file) {
            (Some(text), _) => ReplySource::Text(text),
            (None, Some(file)) => ReplySource::File(file),
            (None, None) => ReplySource::Stdin,
        }
    }

    fn read(self) -> Result<String, AuditCommandError> {
        match self {
            ReplySource::Text(text) => Ok(text),
            ReplySource::File(path) => read_file(&path),
            ReplySource::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

fn read_file(path: &Path) -> Result<String, AuditCommandError> {
    std::fs::read_to_string(path).map_err(|source| AuditCommandError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the audit command
///
/// # Returns
///
/// Exit code:
/// - 0: Not misled
/// - 1: Misled
/// - 2: Error (unknown domain, unreadable input, rule failure)
pub fn run_audit(
    config: &Config,
    domain: &str,
    source: ReplySource,
    format: Option<OutputFormat>,
    color: Option<ColorChoice>,
) -> i32 {
    let format = format.unwrap_or_else(|| config.output.format.into());

    match run_audit_inner(config, domain, source) {
        Ok(result) => {
            if let Err(e) = print_result(&result, format, stdout_color(color, config)) {
                eprintln!("Error: {}", e);
                return EXIT_ERROR;
            }
            match result.status {
                AuditStatus::Misled => EXIT_MISLED,
                AuditStatus::NotMisled => EXIT_SUCCESS,
                AuditStatus::AuditError => EXIT_ERROR,
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn run_audit_inner(
    config: &Config,
    domain: &str,
    source: ReplySource,
) -> Result<AuditResult, AuditCommandError> {
    let engine = AuditEngine::new(build_registry(config)?);

    // Fail on an unknown domain before blocking on stdin
    if engine.registry().get(domain).is_none() {
        return Err(AuditError::UnknownDomain(domain.to_string()).into());
    }

    let text = source.read()?;
    Ok(engine.audit(domain, &text)?)
}

fn print_result(
    result: &AuditResult,
    format: OutputFormat,
    color: termcolor::ColorChoice,
) -> io::Result<()> {
    match format {
        OutputFormat::Human => {
            let mut stdout = StandardStream::stdout(color);
            HumanFormatter::new().write_result(&mut stdout, result)
        }
        OutputFormat::Jsonl => {
            print!("{}", JsonlFormatter::new().format_result(result));
            Ok(())
        }
    }
}
