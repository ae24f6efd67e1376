//! Error types for Veracity
//!
//! This module defines the error types used throughout Veracity, following
//! a hierarchical structure with specific error variants for different
//! error categories.

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid TOML syntax or shape
    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Semantically invalid configuration
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Rule-related errors
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Invalid rule definition
    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    /// A rule for this domain is already registered
    #[error("Duplicate domain: {0}")]
    DuplicateDomain(String),

    /// Rule not found
    #[error("Rule not found: {0}")]
    NotFound(String),
}

/// Errors surfaced by the audit boundary
///
/// Failures raised inside a rule never show up here; they are downgraded to
/// an `audit-error` verdict by the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// No rule is registered for the requested domain
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    /// The claim text was missing or not a string
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

/// Top-level error type for Veracity
#[derive(Debug, thiserror::Error)]
pub enum VeracityError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule error
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Audit error
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
