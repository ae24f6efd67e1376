#![forbid(unsafe_code)]

//! Veracity: misleading-claim audits for model replies
//!
//! Veracity checks a free-text reply against a domain rule and decides
//! whether the reply states something implausible for that domain: a value
//! out of physical range, a suspicious zero, a positive claim contradicted
//! by its own context, or degenerate repetition. Rules are lexical and
//! deterministic; they are declared in TOML and compiled once.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod logging;
pub mod output;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{AuditError, ConfigError, RuleError, VeracityError};

// Re-export core domain types for convenient access
pub use engine::{AuditEngine, AuditResult, AuditStatus};
pub use rules::{DomainRule, RuleRegistry};
pub use types::{Comparison, DomainId, GlobPattern, Quantifier, Shape};
