//! Veracity CLI entry point

use clap::Parser;
use std::process;
use veracity::cli::common::{EXIT_ERROR, EXIT_SUCCESS, config_exit_code, load_config};
use veracity::cli::{ColorChoice, Command, ReplySource, args::Cli};
use veracity::logging::init_tracing;

const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        // Init must work even when an existing veracity.toml is broken
        Command::Init { force } => {
            init_tracing(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL));
            run_init(force)
        }
        command => run_configured(command, cli.color, cli.log_level.as_deref()),
    };

    process::exit(exit_code);
}

fn run_init(force: bool) -> i32 {
    match veracity::cli::init::run_init(force) {
        Ok(_) => {
            println!("Created veracity.toml. Add custom domains under veracity/rules/.");
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn run_configured(command: Command, color: Option<ColorChoice>, log_level: Option<&str>) -> i32 {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(log_level.unwrap_or(DEFAULT_LOG_LEVEL));
            eprintln!("Error: {}", e);
            return config_exit_code(&e);
        }
    };
    init_tracing(log_level.unwrap_or(config.logging.level.as_str()));

    match command {
        Command::Audit {
            domain,
            text,
            file,
            format,
        } => veracity::cli::audit::run_audit(
            &config,
            &domain,
            ReplySource::from_args(text, file),
            format,
            color,
        ),
        Command::Batch {
            paths,
            format,
            jobs,
        } => veracity::cli::batch::run_batch(config, &paths, format, jobs, color),
        Command::List { format } => veracity::cli::list::run_list(&config, format),
        Command::Init { force } => run_init(force),
    }
}
