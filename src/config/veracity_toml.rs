//! Parsing and validation for veracity.toml configuration files

use crate::error::ConfigError;
use crate::types::{DomainId, GlobPattern};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "veracity.toml";

/// Main configuration struct for veracity.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Veracity metadata
    pub veracity: VeracityMeta,

    /// Domain rule configuration
    #[serde(default)]
    pub rules: RulesConfig,

    /// Transcript server name to domain mapping
    #[serde(default)]
    pub servers: BTreeMap<String, DomainId>,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            veracity: VeracityMeta {
                version: "1".to_string(),
                include: default_include(),
                exclude: Vec::new(),
            },
            rules: RulesConfig::default(),
            servers: BTreeMap::new(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the domain a transcript server's records belong to
    ///
    /// The `[servers]` table wins; otherwise a rule whose settings list the
    /// server under `servers` claims it. Returns `None` when neither applies.
    pub fn domain_for_server(&self, server: &str) -> Option<DomainId> {
        if let Some(domain) = self.servers.get(server) {
            return Some(domain.clone());
        }

        self.rules
            .iter()
            .find(|(_, value)| match value {
                RuleValue::Settings(settings) => settings
                    .servers
                    .as_ref()
                    .is_some_and(|servers| servers.iter().any(|s| s == server)),
                RuleValue::Enabled(_) => false,
            })
            .map(|(domain, _)| domain.clone())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.veracity.version != "1" {
            return Err(ConfigError::Validation(format!(
                "Unsupported configuration version '{}'. Expected '1'",
                self.veracity.version
            )));
        }

        // Validate glob patterns by attempting to compile them with globset
        for pattern in &self.veracity.include {
            globset::Glob::new(pattern.as_str()).map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid include glob pattern '{}': {}",
                    pattern.as_str(),
                    e
                ))
            })?;
        }

        for pattern in &self.veracity.exclude {
            globset::Glob::new(pattern.as_str()).map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid exclude glob pattern '{}': {}",
                    pattern.as_str(),
                    e
                ))
            })?;
        }

        // A domain cannot be both builtin and custom
        for domain in self.rules.custom.keys() {
            if self.rules.builtin.contains_key(domain) {
                return Err(ConfigError::Validation(format!(
                    "Domain '{}' is configured under both [rules] and [rules.custom]",
                    domain
                )));
            }
        }

        // A server alias may route to only one domain
        let mut claimed: HashMap<&str, &DomainId> = HashMap::new();
        for (domain, value) in self.rules.iter() {
            let RuleValue::Settings(settings) = value else {
                continue;
            };
            for server in settings.servers.iter().flatten() {
                if server.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "Empty server alias for domain '{}'",
                        domain
                    )));
                }
                if let Some(previous) = claimed.insert(server.as_str(), domain)
                    && previous != domain
                {
                    return Err(ConfigError::Validation(format!(
                        "Server '{}' is mapped to both '{}' and '{}'",
                        server, previous, domain
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Veracity metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeracityMeta {
    /// Configuration version (must be "1")
    pub version: String,

    /// Transcript file patterns to include
    #[serde(default = "default_include")]
    pub include: Vec<GlobPattern>,

    /// Transcript file patterns to exclude
    #[serde(default)]
    pub exclude: Vec<GlobPattern>,
}

fn default_include() -> Vec<GlobPattern> {
    vec![GlobPattern::new("**/*.jsonl")]
}

/// Rules configuration section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Built-in domains (flattened from `[rules]` table, excluding `[rules.custom]`)
    #[serde(flatten)]
    pub builtin: HashMap<DomainId, RuleValue>,

    /// Custom domains from `[rules.custom]` section
    #[serde(default)]
    pub custom: HashMap<DomainId, RuleValue>,
}

impl RulesConfig {
    /// Iterate over builtin then custom entries
    pub fn iter(&self) -> impl Iterator<Item = (&DomainId, &RuleValue)> {
        self.builtin.iter().chain(self.custom.iter())
    }

    /// Look up a domain in either table
    pub fn get(&self, domain: &DomainId) -> Option<&RuleValue> {
        self.builtin.get(domain).or_else(|| self.custom.get(domain))
    }
}

/// A domain can be enabled with a boolean or configured with settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// Simple boolean enable/disable
    Enabled(bool),
    /// Settings table for the domain
    Settings(RuleSettings),
}

impl RuleValue {
    pub fn is_enabled(&self) -> bool {
        match self {
            RuleValue::Enabled(enabled) => *enabled,
            RuleValue::Settings(settings) => settings.enabled.unwrap_or(true),
        }
    }
}

/// Settings for individual domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    /// Explicit enable flag; a settings table alone enables the domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Transcript server names whose records are audited against this domain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<String>>,
}

/// Output configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Color output setting
    #[serde(default)]
    pub color: ColorOption,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            color: ColorOption::Auto,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON Lines format
    Jsonl,
}

/// Color output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    /// Auto-detect based on terminal capabilities
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset
    #[serde(default)]
    pub level: LogLevel,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
