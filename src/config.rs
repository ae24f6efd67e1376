//! Configuration file parsing and validation

pub mod veracity_toml;

pub use veracity_toml::{
    CONFIG_FILE, ColorOption, Config, LogLevel, LoggingConfig, OutputConfig, OutputFormat,
    RuleSettings, RuleValue, RulesConfig,
};
