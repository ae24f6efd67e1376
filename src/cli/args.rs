//! CLI argument parsing using clap

use crate::config;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for veracity commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

impl From<config::OutputFormat> for OutputFormat {
    fn from(format: config::OutputFormat) -> Self {
        match format {
            config::OutputFormat::Human => OutputFormat::Human,
            config::OutputFormat::Jsonl => OutputFormat::Jsonl,
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

impl From<config::ColorOption> for ColorChoice {
    fn from(color: config::ColorOption) -> Self {
        match color {
            config::ColorOption::Auto => ColorChoice::Auto,
            config::ColorOption::Always => ColorChoice::Always,
            config::ColorOption::Never => ColorChoice::Never,
        }
    }
}

/// Veracity CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "veracity")]
#[command(about = "Audit model replies for misleading numeric and factual claims")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring (defaults to the `[output] color` setting)
    #[arg(long, global = true)]
    pub color: Option<ColorChoice>,

    /// Log filter, e.g. `debug` or `veracity=trace` (overrides `[logging] level`)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Available veracity subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Audit one reply against one domain
    Audit {
        /// Domain ID to audit against
        #[arg(short, long)]
        domain: String,

        /// Reply text (reads stdin when neither --text nor --file is given)
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the reply text from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Audit every record of JSONL transcript files
    Batch {
        /// Files or directories to audit (defaults to current directory)
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Number of worker threads (defaults to one per core)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List all enabled domains
    List {
        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Initialize veracity in this directory
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}
