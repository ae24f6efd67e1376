#![forbid(unsafe_code)]

//! Domain rule definitions and registry

pub mod builtin;
mod condition;
pub mod registry;
mod rule;
pub mod shaped_rule;

// Re-export core types
pub use builtin::{is_builtin_domain, load_builtin_rules};
pub use registry::RuleRegistry;
pub use rule::DomainRule;
pub use shaped_rule::ShapedRule;
