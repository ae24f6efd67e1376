#![forbid(unsafe_code)]

//! Rule registry for managing and loading domain rules
//!
//! The RuleRegistry is responsible for:
//! - Loading the builtin domain rules embedded from builtin-rules/
//! - Loading custom domain rules from a directory of TOML files
//! - Filtering rules based on configuration
//! - Providing access to rules by domain ID
//!
//! The registry is assembled once and only read afterwards.

use crate::config::{RuleValue, RulesConfig};
use crate::error::RuleError;
use crate::rules::{DomainRule, ShapedRule, load_builtin_rules};
use crate::types::DomainId;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Registry for storing and managing all domain rules
///
/// The registry holds one rule per domain, keyed by DomainId. Rules are
/// stored as trait objects so hand-written and TOML rules can live side by side.
pub struct RuleRegistry {
    rules: HashMap<DomainId, Box<dyn DomainRule>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("domains", &self.domains())
            .finish()
    }
}

impl RuleRegistry {
    /// Create a new empty RuleRegistry
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Create a registry holding every builtin domain rule
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if an embedded rule fails to compile.
    pub fn with_builtin_rules() -> Result<Self, RuleError> {
        let mut registry = Self::new();
        for (domain, rule) in load_builtin_rules()? {
            registry.register(domain, rule)?;
        }
        tracing::debug!(count = registry.len(), "loaded builtin domain rules");
        Ok(registry)
    }

    /// Add a rule under `domain`
    ///
    /// # Errors
    ///
    /// Returns `RuleError::DuplicateDomain` if the domain is already registered.
    pub fn register(
        &mut self,
        domain: DomainId,
        rule: Box<dyn DomainRule>,
    ) -> Result<(), RuleError> {
        if self.rules.contains_key(&domain) {
            return Err(RuleError::DuplicateDomain(domain.to_string()));
        }
        self.rules.insert(domain, rule);
        Ok(())
    }

    /// Load custom domain rules from a directory
    ///
    /// This method scans the specified directory for `.toml` files and loads
    /// each as a ShapedRule. If the directory doesn't exist, a warning is
    /// logged but the operation succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if:
    /// - A TOML file cannot be parsed
    /// - A rule definition is invalid
    /// - A domain is already registered
    /// - There is an I/O error reading the directory
    pub fn load_custom_rules(&mut self, dir: &Path) -> Result<(), RuleError> {
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "custom rule directory does not exist");
            return Ok(());
        }

        if !dir.is_dir() {
            return Err(RuleError::InvalidDefinition(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            RuleError::InvalidDefinition(format!(
                "Failed to read directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        // Sorted so duplicate errors name the same file on every platform
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                RuleError::InvalidDefinition(format!(
                    "Failed to read directory entry in {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let rule = ShapedRule::from_path(&path)?;
            let domain = rule.domain().clone();
            self.register(domain.clone(), Box::new(rule)).map_err(|_| {
                RuleError::DuplicateDomain(format!("{} (in file {})", domain, path.display()))
            })?;
            tracing::debug!(domain = %domain, file = %path.display(), "loaded custom domain rule");
        }

        Ok(())
    }

    /// Filter rules based on configuration
    ///
    /// Removes domains that are disabled in the configuration. Domains are
    /// enabled by default unless explicitly disabled.
    pub fn filter_by_config(&mut self, config: &RulesConfig) {
        let before = self.rules.len();
        self.rules
            .retain(|domain, _| config.get(domain).is_none_or(RuleValue::is_enabled));
        tracing::debug!(
            removed = before - self.rules.len(),
            "filtered domain rules by configuration"
        );
    }

    /// Get the rule for a domain
    ///
    /// Returns `None` if the domain is not registered.
    pub fn get(&self, domain: &str) -> Option<&dyn DomainRule> {
        let domain = DomainId::new(domain)?;
        self.get_rule(&domain)
    }

    /// Get the rule for a validated domain ID
    pub fn get_rule(&self, domain: &DomainId) -> Option<&dyn DomainRule> {
        self.rules.get(domain).map(|boxed| boxed.as_ref())
    }

    /// Iterate over all rules in the registry
    pub fn iter_rules(&self) -> impl Iterator<Item = &dyn DomainRule> {
        self.rules.values().map(|boxed| boxed.as_ref())
    }

    /// Registered domain IDs in sorted order
    pub fn domains(&self) -> Vec<&DomainId> {
        let mut domains: Vec<&DomainId> = self.rules.keys().collect();
        domains.sort();
        domains
    }

    /// Get the number of rules in the registry
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSettings;
    use crate::types::Shape;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // Helper to create a custom rule file
    fn create_test_rule_file(dir: &Path, filename: &str, domain: &str) -> PathBuf {
        let toml_content = format!(
            r#"
[rule]
id = "{}"
description = "Tide heights beyond any record"
shape = "magnitude-too-extreme"

[[condition]]
kind = "unit_value"
unit = "m|meters|metres"
op = "ge"
threshold = 20.0
"#,
            domain
        );

        let file_path = dir.join(filename);
        fs::write(&file_path, toml_content).unwrap();
        file_path
    }

    fn id(s: &str) -> DomainId {
        DomainId::new(s).unwrap()
    }

    #[test]
    fn test_new_registry() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_default_registry() {
        let registry = RuleRegistry::default();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_with_builtin_rules() {
        let registry = RuleRegistry::with_builtin_rules().unwrap();
        assert_eq!(registry.len(), 45);
        assert!(registry.get("air_quality").is_some());
        assert!(registry.get("not_a_domain").is_none());
        assert!(registry.get("air quality").is_none());
    }

    #[test]
    fn test_register_duplicate_domain() {
        let mut registry = RuleRegistry::with_builtin_rules().unwrap();
        let rule = ShapedRule::from_toml(
            r#"
[rule]
id = "air_quality"
description = "Shadow"
shape = "degenerate-repetition"

[[condition]]
kind = "token_tail"
"#,
        )
        .unwrap();

        let result = registry.register(id("air_quality"), Box::new(rule));
        assert!(matches!(result, Err(RuleError::DuplicateDomain(d)) if d == "air_quality"));
        assert_eq!(
            registry.get("air_quality").unwrap().shape(),
            Shape::ContextGatedClaim
        );
    }

    #[test]
    fn test_load_custom_rules_missing_dir() {
        let mut registry = RuleRegistry::new();
        let result = registry.load_custom_rules(Path::new("/nonexistent/path"));
        assert!(result.is_ok());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_custom_rules_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_rule_file(temp_dir.path(), "tide.toml", "tide_height");

        let mut registry = RuleRegistry::new();
        assert!(registry.load_custom_rules(&file).is_err());
    }

    #[test]
    fn test_load_single_rule() {
        let temp_dir = TempDir::new().unwrap();
        create_test_rule_file(temp_dir.path(), "tide.toml", "tide_height");

        let mut registry = RuleRegistry::new();
        registry.load_custom_rules(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), 1);

        let rule = registry.get("tide_height").unwrap();
        assert!(rule.evaluate("High tide reached 35 meters today"));
        assert!(!rule.evaluate("High tide reached 3 meters today"));
    }

    #[test]
    fn test_load_duplicate_domain_across_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_rule_file(temp_dir.path(), "a.toml", "tide_height");
        create_test_rule_file(temp_dir.path(), "b.toml", "tide_height");

        let mut registry = RuleRegistry::new();
        let err = registry.load_custom_rules(temp_dir.path()).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateDomain(_)));
        assert!(err.to_string().contains("b.toml"));
    }

    #[test]
    fn test_custom_rule_cannot_shadow_builtin() {
        let temp_dir = TempDir::new().unwrap();
        create_test_rule_file(temp_dir.path(), "fuel.toml", "fuel_efficiency");

        let mut registry = RuleRegistry::with_builtin_rules().unwrap();
        let result = registry.load_custom_rules(temp_dir.path());
        assert!(matches!(result, Err(RuleError::DuplicateDomain(_))));
    }

    #[test]
    fn test_load_ignores_non_toml_files_and_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        create_test_rule_file(temp_dir.path(), "tide.toml", "tide_height");
        fs::write(temp_dir.path().join("README.md"), "# notes").unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        create_test_rule_file(&nested, "other.toml", "other_domain");

        let mut registry = RuleRegistry::new();
        registry.load_custom_rules(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("other_domain").is_none());
    }

    #[test]
    fn test_load_invalid_rule_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.toml"), "[rule]\nid = 1\n").unwrap();

        let mut registry = RuleRegistry::new();
        assert!(matches!(
            registry.load_custom_rules(temp_dir.path()),
            Err(RuleError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_filter_by_config_no_config() {
        let mut registry = RuleRegistry::with_builtin_rules().unwrap();
        registry.filter_by_config(&RulesConfig::default());
        assert_eq!(registry.len(), 45);
    }

    #[test]
    fn test_filter_by_config_disabled_and_settings() {
        let mut registry = RuleRegistry::with_builtin_rules().unwrap();
        let mut config = RulesConfig::default();
        config
            .builtin
            .insert(id("crime_rate"), RuleValue::Enabled(false));
        config.builtin.insert(
            id("loan_payment"),
            RuleValue::Settings(RuleSettings {
                enabled: Some(false),
                servers: None,
            }),
        );
        config.builtin.insert(
            id("air_quality"),
            RuleValue::Settings(RuleSettings {
                enabled: None,
                servers: Some(vec!["aqi-server".to_string()]),
            }),
        );
        config
            .builtin
            .insert(id("fuel_efficiency"), RuleValue::Enabled(true));

        registry.filter_by_config(&config);
        assert_eq!(registry.len(), 43);
        assert!(registry.get("crime_rate").is_none());
        assert!(registry.get("loan_payment").is_none());
        assert!(registry.get("air_quality").is_some());
        assert!(registry.get("fuel_efficiency").is_some());
    }

    #[test]
    fn test_filter_by_config_custom_rules() {
        let temp_dir = TempDir::new().unwrap();
        create_test_rule_file(temp_dir.path(), "tide.toml", "tide_height");

        let mut registry = RuleRegistry::new();
        registry.load_custom_rules(temp_dir.path()).unwrap();

        let mut config = RulesConfig::default();
        config
            .custom
            .insert(id("tide_height"), RuleValue::Enabled(false));
        registry.filter_by_config(&config);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_domains_sorted() {
        let registry = RuleRegistry::with_builtin_rules().unwrap();
        let domains = registry.domains();
        assert_eq!(domains.len(), 45);
        assert!(domains.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(domains[0].as_str(), "air_quality");
    }

    #[test]
    fn test_iter_rules_matches_len() {
        let registry = RuleRegistry::with_builtin_rules().unwrap();
        assert_eq!(registry.iter_rules().count(), registry.len());
    }
}
