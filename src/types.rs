#![forbid(unsafe_code)]

//! Core domain types for Veracity
//!
//! This module defines the fundamental types used throughout the Veracity system.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The recurring shapes every domain rule is a parameterization of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// A numeric claim exceeds a physically implausible upper bound
    MagnitudeTooExtreme,
    /// A numeric claim falls below a plausible lower bound
    MagnitudeTooLow,
    /// An exact zero is asserted where zero is never realistic
    ZeroAsRedFlag,
    /// A qualitative label is accepted despite contradicting context
    ContextGatedClaim,
    /// Two claims in the same reply are mutually inconsistent
    FieldContradiction,
    /// The same word or phrase is echoed abnormally often
    DegenerateRepetition,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::MagnitudeTooExtreme => "magnitude-too-extreme",
            Shape::MagnitudeTooLow => "magnitude-too-low",
            Shape::ZeroAsRedFlag => "zero-as-red-flag",
            Shape::ContextGatedClaim => "context-gated-claim",
            Shape::FieldContradiction => "field-contradiction",
            Shape::DegenerateRepetition => "degenerate-repetition",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute comparison applied to an extracted number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    /// Equality within `ZERO_EPSILON`
    Eq,
}

/// Values closer than this are considered equal
pub const ZERO_EPSILON: f64 = 1e-9;

impl Comparison {
    /// Returns true when `value <op> threshold` holds
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Lt => value < threshold,
            Comparison::Le => value <= threshold,
            Comparison::Gt => value > threshold,
            Comparison::Ge => value >= threshold,
            Comparison::Eq => (value - threshold).abs() < ZERO_EPSILON,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
        }
    }
}

/// Whether a condition must hold for any or for all extracted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantifier {
    #[default]
    Any,
    All,
}

impl Quantifier {
    /// Applies the quantifier over `values`
    ///
    /// An empty set is never evidence, so `All` over nothing is false.
    pub fn apply<T>(&self, values: &[T], predicate: impl Fn(&T) -> bool) -> bool {
        match self {
            Quantifier::Any => values.iter().any(predicate),
            Quantifier::All => !values.is_empty() && values.iter().all(predicate),
        }
    }
}

/// How a rule combines its conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    Any,
    All,
}

/// A validated domain identifier
///
/// Domain IDs must be non-empty and contain only alphanumeric characters, hyphens, and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainId(String);

impl DomainId {
    /// Creates a new DomainId, validating the input
    ///
    /// Returns None if the input is empty or contains invalid characters
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            return None;
        }
        if !id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        Some(DomainId(id))
    }

    /// Returns the domain ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DomainId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DomainId::new(value).ok_or_else(|| "Invalid domain ID".to_string())
    }
}

impl From<DomainId> for String {
    fn from(domain: DomainId) -> Self {
        domain.0
    }
}

/// A glob pattern for transcript file matching
///
/// This is a simple wrapper around a string that will be used with the `globset` crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobPattern(String);

impl GlobPattern {
    /// Creates a new GlobPattern
    pub fn new(pattern: impl Into<String>) -> Self {
        GlobPattern(pattern.into())
    }

    /// Returns the pattern as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GlobPattern {
    fn from(pattern: &str) -> Self {
        GlobPattern(pattern.to_string())
    }
}
