//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading configuration,
//! discovering transcript files, building rule registries and choosing
//! terminal colors.

use crate::cli::args::ColorChoice;
use crate::config::{CONFIG_FILE, Config};
use crate::engine::{FileWalker, FileWalkerError};
use crate::error::{ConfigError, RuleError};
use crate::rules::RuleRegistry;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_MISLED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Directory holding custom domain rule definitions
pub const CUSTOM_RULES_DIR: &str = "veracity/rules";

/// Load veracity.toml from the working directory
///
/// The file is optional: when it is absent the defaults apply.
///
/// # Errors
///
/// Returns `ConfigError::Io` if veracity.toml exists but cannot be read.
/// Returns `ConfigError::Parse` if veracity.toml is invalid TOML.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_in(Path::new("."))
}

fn load_config_in(dir: &Path) -> Result<Config, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "no configuration file, using defaults");
        return Ok(Config::default());
    }

    Config::load(&config_path)
}

/// Exit code for a configuration failure
pub fn config_exit_code(error: &ConfigError) -> i32 {
    match error {
        ConfigError::Parse(_) => EXIT_PARSE_ERROR,
        _ => EXIT_ERROR,
    }
}

/// Discover transcript files using FileWalker
///
/// Walks the specified paths and collects all files that match the
/// include/exclude patterns from the configuration.
///
/// # Errors
///
/// Returns `FileWalkerError` if there is an error walking the file system.
pub(crate) fn discover_files(
    paths: &[String],
    config: &Config,
) -> Result<Vec<PathBuf>, FileWalkerError> {
    let mut all_files = Vec::new();

    for path_str in paths {
        let walker = FileWalker::new(
            Path::new(path_str),
            &config.veracity.include,
            &config.veracity.exclude,
        )?;
        for result in walker.walk() {
            all_files.push(result?);
        }
    }

    Ok(all_files)
}

/// Build the rule registry from configuration
///
/// This function:
/// 1. Loads the embedded builtin rules
/// 2. Loads custom rules from `veracity/rules/` (if present)
/// 3. Filters rules based on configuration
///
/// # Errors
///
/// Returns `RuleError` if there is an error loading or building rules.
pub fn build_registry(config: &Config) -> Result<RuleRegistry, RuleError> {
    build_registry_from(config, Path::new(CUSTOM_RULES_DIR))
}

fn build_registry_from(config: &Config, custom_dir: &Path) -> Result<RuleRegistry, RuleError> {
    let mut registry = RuleRegistry::with_builtin_rules()?;
    if custom_dir.is_dir() {
        registry.load_custom_rules(custom_dir)?;
    }
    registry.filter_by_config(&config.rules);
    tracing::debug!(domains = registry.len(), "rule registry ready");
    Ok(registry)
}

/// Resolve the color choice for stdout
///
/// An explicit `--color` wins over the config file. `auto` only colors an
/// interactive terminal.
pub(crate) fn stdout_color(choice: Option<ColorChoice>, config: &Config) -> termcolor::ColorChoice {
    let choice = choice.unwrap_or_else(|| config.output.color.into());
    match choice {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto if std::io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
        ColorChoice::Auto => termcolor::ColorChoice::Never,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorOption;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_in(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_config_parse_error_exit_code() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[veracity\nversion = ").unwrap();

        let err = load_config_in(dir.path()).unwrap_err();
        assert_eq!(config_exit_code(&err), EXIT_PARSE_ERROR);
    }

    #[test]
    fn test_validation_error_exit_code() {
        let err = ConfigError::Validation("bad".to_string());
        assert_eq!(config_exit_code(&err), EXIT_ERROR);
    }

    #[test]
    fn test_discover_files_with_empty_paths() {
        let result = discover_files(&[], &Config::default());
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_discover_files_uses_config_globs() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("run.jsonl"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let root = dir.path().to_string_lossy().to_string();
        let files = discover_files(&[root], &Config::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("run.jsonl"));
    }

    #[test]
    fn test_build_registry_with_default_config() {
        let dir = TempDir::new().unwrap();
        let registry = build_registry_from(&Config::default(), &dir.path().join("none")).unwrap();
        assert_eq!(registry.len(), 45);
    }

    #[test]
    fn test_build_registry_applies_config_and_custom_rules() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("tide_height.toml"),
            r#"
[rule]
id = "tide_height"
description = "Tides above 20 m"
shape = "magnitude-too-extreme"

[[condition]]
kind = "unit_value"
unit = "m|meters"
op = "ge"
threshold = 20.0
"#,
        )
        .unwrap();

        let config = Config::parse(
            r#"
[veracity]
version = "1"

[rules]
crime_rate = false
"#,
        )
        .unwrap();

        let registry = build_registry_from(&config, dir.path()).unwrap();
        assert_eq!(registry.len(), 45);
        assert!(registry.get("tide_height").is_some());
        assert!(registry.get("crime_rate").is_none());
    }

    #[test]
    fn test_stdout_color_explicit_choice_wins() {
        let mut config = Config::default();
        config.output.color = ColorOption::Always;
        assert_eq!(
            stdout_color(Some(ColorChoice::Never), &config),
            termcolor::ColorChoice::Never
        );
        assert_eq!(stdout_color(None, &config), termcolor::ColorChoice::Always);
    }
}
