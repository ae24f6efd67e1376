#![forbid(unsafe_code)]

//! TOML-defined domain rules
//!
//! This module provides ShapedRule, a domain rule expressed as a context
//! gate plus a list of conditions joined by a combinator. Every builtin
//! domain is one of these; custom domains use the same format.

use crate::error::RuleError;
use crate::extract::{Claim, Vocabulary};
use crate::rules::DomainRule;
use crate::rules::condition::{Condition, ConditionDefinition};
use crate::types::{Combinator, DomainId, Shape};
use serde::Deserialize;
use std::path::Path;

/// TOML structure for rule definitions
///
/// This structure is deserialized from TOML files in builtin-rules/ or a
/// custom rules directory.
#[derive(Debug, Deserialize)]
struct RuleDefinition {
    rule: RuleSection,
    #[serde(default)]
    gate: Option<GateSection>,
    #[serde(default, rename = "condition")]
    conditions: Vec<ConditionDefinition>,
}

#[derive(Debug, Deserialize)]
struct RuleSection {
    id: String,
    description: String,
    shape: Shape,
    #[serde(default)]
    combinator: Combinator,
}

#[derive(Debug, Deserialize)]
struct GateSection {
    groups: Vec<Vec<String>>,
}

/// A domain rule built from a gate, conditions, and a combinator
///
/// The gate is a list of keyword groups; each group must contribute at least
/// one keyword before any condition is checked. With no gate the conditions
/// always run.
pub struct ShapedRule {
    domain: DomainId,
    description: String,
    shape: Shape,
    gate: Vec<Vocabulary>,
    conditions: Vec<Condition>,
    combinator: Combinator,
}

impl std::fmt::Debug for ShapedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedRule")
            .field("domain", &self.domain)
            .field("description", &self.description)
            .field("shape", &self.shape)
            .field("gate_groups", &self.gate.len())
            .field("conditions", &self.conditions.len())
            .field("combinator", &self.combinator)
            .finish()
    }
}

impl ShapedRule {
    /// Parse a ShapedRule from TOML content
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidDefinition` if:
    /// - TOML syntax is invalid
    /// - Required fields are missing
    /// - The domain ID is invalid
    /// - No condition is given, or a gate group is empty
    ///
    /// Returns `RuleError::InvalidRegex` if a pattern fails to compile.
    pub fn from_toml(content: &str) -> Result<Self, RuleError> {
        let def: RuleDefinition = toml::from_str(content)
            .map_err(|e| RuleError::InvalidDefinition(format!("Failed to parse TOML: {}", e)))?;

        let domain = DomainId::new(def.rule.id.clone()).ok_or_else(|| {
            RuleError::InvalidDefinition(format!("Invalid domain ID: {}", def.rule.id))
        })?;

        if def.conditions.is_empty() {
            return Err(RuleError::InvalidDefinition(format!(
                "Rule '{}' defines no conditions",
                domain
            )));
        }

        let gate = def
            .gate
            .map(|g| g.groups)
            .unwrap_or_default()
            .iter()
            .map(|group| Vocabulary::new(group))
            .collect::<Result<Vec<_>, _>>()?;

        let conditions = def
            .conditions
            .into_iter()
            .map(Condition::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ShapedRule {
            domain,
            description: def.rule.description,
            shape: def.rule.shape,
            gate,
            conditions,
            combinator: def.rule.combinator,
        })
    }

    /// Parse a ShapedRule from a TOML file path
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuleError::InvalidDefinition(format!("Failed to read file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    fn gate_open(&self, claim: &Claim) -> bool {
        self.gate.iter().all(|group| group.is_present(claim))
    }
}

impl DomainRule for ShapedRule {
    fn domain(&self) -> &DomainId {
        &self.domain
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn explain(&self, text: &str) -> Option<String> {
        let claim = Claim::new(text);
        if !self.gate_open(&claim) {
            return None;
        }

        match self.combinator {
            Combinator::Any => self.conditions.iter().find_map(|c| c.check(&claim)),
            Combinator::All => {
                let fired: Vec<String> = self
                    .conditions
                    .iter()
                    .map(|c| c.check(&claim))
                    .collect::<Option<Vec<_>>>()?;
                Some(fired.join("; "))
            }
        }
    }
}
