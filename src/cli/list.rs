//! List command implementation
//!
//! This module implements the `veracity list` command, which lists every
//! enabled domain with its shape, source (builtin/custom) and description.

use crate::cli::args::OutputFormat;
use crate::cli::common::{EXIT_ERROR, EXIT_SUCCESS, build_registry};
use crate::config::Config;
use crate::output::{DomainInfo, DomainListHumanFormatter, DomainListJsonlFormatter};

/// Error type specific to list command
#[derive(Debug, thiserror::Error)]
enum ListError {
    #[error("Rule error: {0}")]
    Rule(#[from] crate::error::RuleError),
}

/// Run the list command
///
/// # Returns
///
/// Exit code:
/// - 0: Success
/// - 2: Error
pub fn run_list(config: &Config, format: Option<OutputFormat>) -> i32 {
    let format = format.unwrap_or_else(|| config.output.format.into());

    match run_list_inner(config, format) {
        Ok(output) => {
            print!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn run_list_inner(config: &Config, format: OutputFormat) -> Result<String, ListError> {
    let registry = build_registry(config)?;
    let domains = DomainInfo::collect(&registry);

    Ok(match format {
        OutputFormat::Human => DomainListHumanFormatter::new().format(&domains),
        OutputFormat::Jsonl => DomainListJsonlFormatter::new().format(&domains),
    })
}
