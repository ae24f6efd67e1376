#![forbid(unsafe_code)]

//! Domain listing formatters
//!
//! This module provides formatters for the `veracity list` command. It
//! supports both human-readable and JSONL output formats.

use crate::rules::{DomainRule, RuleRegistry, is_builtin_domain};
use crate::types::Shape;
use serde::Serialize;

/// Source of a domain rule (builtin or custom)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainSource {
    Builtin,
    Custom,
}

impl DomainSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainSource::Builtin => "builtin",
            DomainSource::Custom => "custom",
        }
    }
}

/// Listing information for a single domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainInfo {
    pub domain: String,
    pub shape: Shape,
    pub source: DomainSource,
    pub description: String,
}

impl DomainInfo {
    pub fn from_rule(rule: &dyn DomainRule) -> Self {
        let domain = rule.domain().as_str().to_string();
        let source = if is_builtin_domain(&domain) {
            DomainSource::Builtin
        } else {
            DomainSource::Custom
        };
        Self {
            domain,
            shape: rule.shape(),
            source,
            description: rule.description().to_string(),
        }
    }

    /// Every domain in the registry, sorted by domain ID
    pub fn collect(registry: &RuleRegistry) -> Vec<DomainInfo> {
        registry
            .domains()
            .into_iter()
            .filter_map(|domain| registry.get_rule(domain))
            .map(Self::from_rule)
            .collect()
    }
}

/// Human-readable formatter for domain listings
pub struct DomainListHumanFormatter;

impl DomainListHumanFormatter {
    pub fn new() -> Self {
        DomainListHumanFormatter
    }

    /// Format domains grouped under their shape
    pub fn format(&self, domains: &[DomainInfo]) -> String {
        let mut output = String::new();
        output.push_str(&format!("Domains ({} enabled):\n", domains.len()));

        let mut shapes: Vec<Shape> = domains.iter().map(|d| d.shape).collect();
        shapes.sort();
        shapes.dedup();

        for shape in shapes {
            output.push('\n');
            output.push_str(&format!("{}:\n", shape));
            for info in domains.iter().filter(|d| d.shape == shape) {
                let marker = match info.source {
                    DomainSource::Builtin => String::new(),
                    DomainSource::Custom => " (custom)".to_string(),
                };
                output.push_str(&format!(
                    "  {}{}  {}\n",
                    info.domain, marker, info.description
                ));
            }
        }

        output
    }
}

impl Default for DomainListHumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSONL formatter for domain listings
pub struct DomainListJsonlFormatter;

impl DomainListJsonlFormatter {
    pub fn new() -> Self {
        DomainListJsonlFormatter
    }

    /// One JSON object per domain
    pub fn format(&self, domains: &[DomainInfo]) -> String {
        let mut output = String::new();
        for info in domains {
            if let Ok(json) = serde_json::to_string(info) {
                output.push_str(&json);
                output.push('\n');
            }
        }
        output
    }
}

impl Default for DomainListJsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}
