#![forbid(unsafe_code)]

//! Core DomainRule trait

use crate::types::{DomainId, Shape};

/// Trait that all domain rules must implement
///
/// A rule is a pure predicate over a claim: it holds no per-call state, so
/// the same rule may be evaluated from any number of threads at once. The
/// trait is `Send + Sync` to enable parallel batch audits.
pub trait DomainRule: Send + Sync {
    /// Returns the domain this rule audits
    fn domain(&self) -> &DomainId;

    /// Returns a human-readable description of the misleading pattern
    fn description(&self) -> &str;

    /// Returns the shape this rule is a parameterization of
    fn shape(&self) -> Shape;

    /// Evaluates the rule and names the condition that fired
    ///
    /// Returns `None` when the claim shows no evidence of the pattern.
    fn explain(&self, text: &str) -> Option<String>;

    /// Returns true if the claim restates the misleading pattern
    fn evaluate(&self, text: &str) -> bool {
        self.explain(text).is_some()
    }
}
