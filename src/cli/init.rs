//! Initialize a veracity project
//!
//! Creates the configuration file and the custom rule directory.

use crate::cli::common::CUSTOM_RULES_DIR;
use crate::config::CONFIG_FILE;
use std::fs;
use std::path::Path;

/// Default content for veracity.toml
const DEFAULT_VERACITY_TOML: &str = r#"[veracity]
version = "1"

# Transcript files audited by `veracity batch`
include = ["**/*.jsonl"]

# Transcript files to skip
# exclude = ["**/scratch/**"]

[rules]
# All builtin domains are enabled by default
# Disable a domain: crime_rate = false
# Route transcript servers to a domain: air_quality = { servers = ["aqi-server"] }

# Domains defined in veracity/rules/*.toml
# [rules.custom]
# tide_height = true

[servers]
# Map a transcript server name to a domain
# "weather-server" = "weather_temperature"

[output]
format = "human"
color = "auto"

[logging]
level = "warn"
"#;

/// Example custom rule written next to the config
const EXAMPLE_RULE_FILE: &str = "tide_height.toml.example";

const EXAMPLE_RULE: &str = r#"# Rename to tide_height.toml to enable
[rule]
id = "tide_height"
description = "Tidal range of 20 m or more"
shape = "magnitude-too-extreme"

[gate]
groups = [["tide", "tidal"]]

[[condition]]
kind = "unit_value"
unit = "m|meters|metres"
op = "ge"
threshold = 20.0
"#;

/// Error type for init command
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path error
    #[error("Path error: {0}")]
    Path(String),
}

/// Result of init command
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitResult {
    /// Files that were created
    pub created: Vec<String>,
    /// Files that were skipped (already existed)
    pub skipped: Vec<String>,
    /// Files that were overwritten
    pub overwritten: Vec<String>,
}

/// Run the init command in the working directory
///
/// Creates:
/// - veracity.toml (main configuration)
/// - veracity/rules/ (directory for custom domain rules)
/// - veracity/rules/tide_height.toml.example
///
/// # Arguments
/// * `force` - If true, overwrite existing files. If false, skip existing files.
pub fn run_init(force: bool) -> Result<InitResult, InitError> {
    run_init_in(Path::new("."), force)
}

fn run_init_in(root: &Path, force: bool) -> Result<InitResult, InitError> {
    let mut result = InitResult::default();

    handle_file(root, CONFIG_FILE, DEFAULT_VERACITY_TOML, force, &mut result)?;
    create_directory(root, CUSTOM_RULES_DIR, &mut result)?;
    handle_file(
        root,
        &format!("{}/{}", CUSTOM_RULES_DIR, EXAMPLE_RULE_FILE),
        EXAMPLE_RULE,
        force,
        &mut result,
    )?;

    Ok(result)
}

/// Handle creation of a single file
fn handle_file(
    root: &Path,
    name: &str,
    content: &str,
    force: bool,
    result: &mut InitResult,
) -> Result<(), InitError> {
    let path = root.join(name);

    if path.exists() {
        if force {
            fs::write(&path, content)?;
            result.overwritten.push(name.to_string());
        } else {
            result.skipped.push(name.to_string());
        }
    } else {
        fs::write(&path, content)?;
        result.created.push(name.to_string());
    }

    Ok(())
}

/// Create a directory if it doesn't exist
fn create_directory(root: &Path, name: &str, result: &mut InitResult) -> Result<(), InitError> {
    let dir_path = root.join(name);

    if dir_path.exists() {
        if dir_path.is_dir() {
            Ok(())
        } else {
            Err(InitError::Path(format!(
                "Path '{}' exists but is not a directory",
                name
            )))
        }
    } else {
        fs::create_dir_all(&dir_path)?;
        result.created.push(format!("{}/", name));
        Ok(())
    }
}
