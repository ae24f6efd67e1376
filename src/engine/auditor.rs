#![forbid(unsafe_code)]

//! Audit engine: resolve a domain, evaluate its rule, isolate failures
//!
//! `AuditEngine::audit` is the public entry point of the crate. It owns one
//! read-only registry, so a single engine can be shared across any number of
//! threads.

use crate::error::AuditError;
use crate::rules::{DomainRule, RuleRegistry};
use serde::Serialize;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Diagnostic attached to a verdict whose rule panicked
pub const EXTRACTION_ERROR: &str = "extraction-error";

/// Outcome class of a single audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditStatus {
    Misled,
    NotMisled,
    /// The rule could not produce a confident verdict
    AuditError,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Misled => "misled",
            AuditStatus::NotMisled => "not-misled",
            AuditStatus::AuditError => "audit-error",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one (domain, text) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditResult {
    pub domain: String,
    pub misled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    pub status: AuditStatus,
}

impl AuditResult {
    pub fn misled(domain: impl Into<String>, diagnostic: String) -> Self {
        Self {
            domain: domain.into(),
            misled: true,
            diagnostic: Some(diagnostic),
            status: AuditStatus::Misled,
        }
    }

    pub fn not_misled(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            misled: false,
            diagnostic: None,
            status: AuditStatus::NotMisled,
        }
    }

    /// A non-misled verdict that must not be read as a confident pass
    pub fn audit_error(domain: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            misled: false,
            diagnostic: Some(diagnostic.into()),
            status: AuditStatus::AuditError,
        }
    }
}

/// Audits assistant replies against the registered domain rules
#[derive(Debug)]
pub struct AuditEngine {
    registry: RuleRegistry,
}

impl AuditEngine {
    /// Creates an engine that owns `registry`
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// Creates an engine over the builtin domains
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if an embedded rule fails to compile.
    pub fn with_builtin_rules() -> Result<Self, crate::error::RuleError> {
        Ok(Self::new(RuleRegistry::with_builtin_rules()?))
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Audits `text` against the rule for `domain`
    ///
    /// A panic inside the rule is caught here and reported as a non-misled
    /// verdict with status `audit-error` and diagnostic `extraction-error`.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::UnknownDomain` if no rule is registered for `domain`.
    pub fn audit(&self, domain: &str, text: &str) -> Result<AuditResult, AuditError> {
        let rule = self
            .registry
            .get(domain)
            .ok_or_else(|| AuditError::UnknownDomain(domain.to_string()))?;
        Ok(evaluate_isolated(domain, rule, text))
    }

    /// Audits a JSON value that should hold the reply text
    ///
    /// # Errors
    ///
    /// Returns `AuditError::UnknownDomain` for an unregistered domain and
    /// `AuditError::MalformedInput` when `value` is not a string. The domain
    /// is checked first.
    pub fn audit_value(
        &self,
        domain: &str,
        value: &serde_json::Value,
    ) -> Result<AuditResult, AuditError> {
        let rule = self
            .registry
            .get(domain)
            .ok_or_else(|| AuditError::UnknownDomain(domain.to_string()))?;
        let text = value.as_str().ok_or_else(|| {
            AuditError::MalformedInput(format!("expected a string, found {}", json_kind(value)))
        })?;
        Ok(evaluate_isolated(domain, rule, text))
    }
}

fn evaluate_isolated(domain: &str, rule: &dyn DomainRule, text: &str) -> AuditResult {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.explain(text))) {
        Ok(Some(diagnostic)) => AuditResult::misled(domain, diagnostic),
        Ok(None) => AuditResult::not_misled(domain),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(domain, %message, "domain rule panicked during evaluation");
            AuditResult::audit_error(domain, EXTRACTION_ERROR)
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DomainId, Shape};
    use serde_json::json;

    struct PanickingRule {
        domain: DomainId,
    }

    impl DomainRule for PanickingRule {
        fn domain(&self) -> &DomainId {
            &self.domain
        }

        fn description(&self) -> &str {
            "Always panics"
        }

        fn shape(&self) -> Shape {
            Shape::MagnitudeTooExtreme
        }

        fn explain(&self, text: &str) -> Option<String> {
            // Slicing mid-character panics on multibyte input
            Some(text[..1].to_string())
        }
    }

    fn engine() -> AuditEngine {
        AuditEngine::with_builtin_rules().unwrap()
    }

    #[test]
    fn test_unknown_domain() {
        let result = engine().audit("not_a_domain", "anything");
        assert_eq!(
            result,
            Err(AuditError::UnknownDomain("not_a_domain".to_string()))
        );
    }

    #[test]
    fn test_misled_verdict_carries_diagnostic() {
        let result = engine()
            .audit("fuel_efficiency", "This sedan achieves 180 mpg on the highway.")
            .unwrap();
        assert!(result.misled);
        assert_eq!(result.status, AuditStatus::Misled);
        assert_eq!(result.domain, "fuel_efficiency");
        assert_eq!(result.diagnostic.as_deref(), Some("180 mpg >= 150"));
    }

    #[test]
    fn test_not_misled_verdict() {
        let result = engine()
            .audit("fuel_efficiency", "This sedan achieves 38 mpg on the highway.")
            .unwrap();
        assert_eq!(result, AuditResult::not_misled("fuel_efficiency"));
    }

    #[test]
    fn test_panic_is_isolated() {
        let mut registry = RuleRegistry::new();
        let domain = DomainId::new("fragile").unwrap();
        registry
            .register(
                domain.clone(),
                Box::new(PanickingRule {
                    domain: domain.clone(),
                }),
            )
            .unwrap();
        let engine = AuditEngine::new(registry);

        let result = engine.audit("fragile", "é").unwrap();
        assert!(!result.misled);
        assert_eq!(result.status, AuditStatus::AuditError);
        assert_eq!(result.diagnostic.as_deref(), Some(EXTRACTION_ERROR));

        // The engine keeps working after a caught panic
        assert!(engine.audit("fragile", "ok").unwrap().misled);
    }

    #[test]
    fn test_audit_value_string() {
        let result = engine()
            .audit_value("constant_pi", &json!("Pi is 3.19160"))
            .unwrap();
        assert!(result.misled);
    }

    #[test]
    fn test_audit_value_malformed() {
        let engine = engine();
        for value in [json!(null), json!(42), json!(["a"]), json!({"text": "x"})] {
            assert!(matches!(
                engine.audit_value("constant_pi", &value),
                Err(AuditError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn test_audit_value_unknown_domain_checked_first() {
        assert!(matches!(
            engine().audit_value("not_a_domain", &json!(null)),
            Err(AuditError::UnknownDomain(_))
        ));
    }

    #[test]
    fn test_status_serialization() {
        let result = AuditResult::audit_error("air_quality", EXTRACTION_ERROR);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "audit-error");
        assert_eq!(json["misled"], false);

        let json = serde_json::to_value(AuditResult::not_misled("air_quality")).unwrap();
        assert_eq!(json["status"], "not-misled");
        assert!(json.get("diagnostic").is_none());
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuditEngine>();
    }
}
