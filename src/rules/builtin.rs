#![forbid(unsafe_code)]

//! Built-in domain rules embedded at compile time
//!
//! Every builtin domain is a TOML file under `builtin-rules/<shape>/`,
//! compiled into the binary with `include_str!` so the audit engine runs
//! without external rule files.

use crate::error::RuleError;
use crate::rules::{DomainRule, ShapedRule};
use crate::types::DomainId;

/// Type alias for a list of rules with their domain IDs
type RuleList = Vec<(DomainId, Box<dyn DomainRule>)>;

/// Embedded `magnitude-too-extreme` rules
const MAGNITUDE_TOO_EXTREME: &[(&str, &str)] = &[
    (
        "battery_life",
        include_str!("../../builtin-rules/magnitude-too-extreme/battery_life.toml"),
    ),
    (
        "body_temperature",
        include_str!("../../builtin-rules/magnitude-too-extreme/body_temperature.toml"),
    ),
    (
        "calorie_content",
        include_str!("../../builtin-rules/magnitude-too-extreme/calorie_content.toml"),
    ),
    (
        "constant_pi",
        include_str!("../../builtin-rules/magnitude-too-extreme/constant_pi.toml"),
    ),
    (
        "earthquake_magnitude",
        include_str!("../../builtin-rules/magnitude-too-extreme/earthquake_magnitude.toml"),
    ),
    (
        "fuel_efficiency",
        include_str!("../../builtin-rules/magnitude-too-extreme/fuel_efficiency.toml"),
    ),
    (
        "heart_rate",
        include_str!("../../builtin-rules/magnitude-too-extreme/heart_rate.toml"),
    ),
    (
        "human_age",
        include_str!("../../builtin-rules/magnitude-too-extreme/human_age.toml"),
    ),
    (
        "human_height",
        include_str!("../../builtin-rules/magnitude-too-extreme/human_height.toml"),
    ),
    (
        "hurricane_category",
        include_str!("../../builtin-rules/magnitude-too-extreme/hurricane_category.toml"),
    ),
    (
        "inflation_rate",
        include_str!("../../builtin-rules/magnitude-too-extreme/inflation_rate.toml"),
    ),
    (
        "internet_speed",
        include_str!("../../builtin-rules/magnitude-too-extreme/internet_speed.toml"),
    ),
    (
        "iq_score",
        include_str!("../../builtin-rules/magnitude-too-extreme/iq_score.toml"),
    ),
    (
        "model_accuracy",
        include_str!("../../builtin-rules/magnitude-too-extreme/model_accuracy.toml"),
    ),
    (
        "restaurant_rating",
        include_str!("../../builtin-rules/magnitude-too-extreme/restaurant_rating.toml"),
    ),
    (
        "salary",
        include_str!("../../builtin-rules/magnitude-too-extreme/salary.toml"),
    ),
    (
        "sleep_duration",
        include_str!("../../builtin-rules/magnitude-too-extreme/sleep_duration.toml"),
    ),
    (
        "stock_price_change",
        include_str!("../../builtin-rules/magnitude-too-extreme/stock_price_change.toml"),
    ),
    (
        "uv_index",
        include_str!("../../builtin-rules/magnitude-too-extreme/uv_index.toml"),
    ),
    (
        "vaccine_efficacy",
        include_str!("../../builtin-rules/magnitude-too-extreme/vaccine_efficacy.toml"),
    ),
    (
        "weather_temperature",
        include_str!("../../builtin-rules/magnitude-too-extreme/weather_temperature.toml"),
    ),
];

/// Embedded `magnitude-too-low` rules
const MAGNITUDE_TOO_LOW: &[(&str, &str)] = &[
    (
        "airfare",
        include_str!("../../builtin-rules/magnitude-too-low/airfare.toml"),
    ),
    (
        "crypto_price",
        include_str!("../../builtin-rules/magnitude-too-low/crypto_price.toml"),
    ),
    (
        "electricity_price",
        include_str!("../../builtin-rules/magnitude-too-low/electricity_price.toml"),
    ),
    (
        "flight_duration",
        include_str!("../../builtin-rules/magnitude-too-low/flight_duration.toml"),
    ),
    (
        "gas_price",
        include_str!("../../builtin-rules/magnitude-too-low/gas_price.toml"),
    ),
    (
        "house_price",
        include_str!("../../builtin-rules/magnitude-too-low/house_price.toml"),
    ),
    (
        "loan_payment",
        include_str!("../../builtin-rules/magnitude-too-low/loan_payment.toml"),
    ),
    (
        "mortgage_rate",
        include_str!("../../builtin-rules/magnitude-too-low/mortgage_rate.toml"),
    ),
];

/// Embedded `zero-as-red-flag` rules
const ZERO_AS_RED_FLAG: &[(&str, &str)] = &[
    (
        "annual_rainfall",
        include_str!("../../builtin-rules/zero-as-red-flag/annual_rainfall.toml"),
    ),
    (
        "covid_cases",
        include_str!("../../builtin-rules/zero-as-red-flag/covid_cases.toml"),
    ),
    (
        "crime_rate",
        include_str!("../../builtin-rules/zero-as-red-flag/crime_rate.toml"),
    ),
    (
        "fraud_detection",
        include_str!("../../builtin-rules/zero-as-red-flag/fraud_detection.toml"),
    ),
    (
        "stock_volatility",
        include_str!("../../builtin-rules/zero-as-red-flag/stock_volatility.toml"),
    ),
    (
        "unemployment_rate",
        include_str!("../../builtin-rules/zero-as-red-flag/unemployment_rate.toml"),
    ),
];

/// Embedded `context-gated-claim` rules
const CONTEXT_GATED_CLAIM: &[(&str, &str)] = &[
    (
        "air_quality",
        include_str!("../../builtin-rules/context-gated-claim/air_quality.toml"),
    ),
    (
        "drinking_water",
        include_str!("../../builtin-rules/context-gated-claim/drinking_water.toml"),
    ),
    (
        "fire_risk",
        include_str!("../../builtin-rules/context-gated-claim/fire_risk.toml"),
    ),
    (
        "password_strength",
        include_str!("../../builtin-rules/context-gated-claim/password_strength.toml"),
    ),
    (
        "snowfall_forecast",
        include_str!("../../builtin-rules/context-gated-claim/snowfall_forecast.toml"),
    ),
];

/// Embedded `field-contradiction` rules
const FIELD_CONTRADICTION: &[(&str, &str)] = &[
    (
        "blood_pressure",
        include_str!("../../builtin-rules/field-contradiction/blood_pressure.toml"),
    ),
    (
        "grade_conversion",
        include_str!("../../builtin-rules/field-contradiction/grade_conversion.toml"),
    ),
    (
        "p_value_significance",
        include_str!("../../builtin-rules/field-contradiction/p_value_significance.toml"),
    ),
];

/// Embedded `degenerate-repetition` rules
const DEGENERATE_REPETITION: &[(&str, &str)] = &[
    (
        "prompt_extension",
        include_str!("../../builtin-rules/degenerate-repetition/prompt_extension.toml"),
    ),
    (
        "sentiment",
        include_str!("../../builtin-rules/degenerate-repetition/sentiment.toml"),
    ),
];

/// Every embedded rule table
const BUILTIN_TABLES: &[&[(&str, &str)]] = &[
    MAGNITUDE_TOO_EXTREME,
    MAGNITUDE_TOO_LOW,
    ZERO_AS_RED_FLAG,
    CONTEXT_GATED_CLAIM,
    FIELD_CONTRADICTION,
    DEGENERATE_REPETITION,
];

/// Number of builtin domains
pub const BUILTIN_RULE_COUNT: usize = MAGNITUDE_TOO_EXTREME.len()
    + MAGNITUDE_TOO_LOW.len()
    + ZERO_AS_RED_FLAG.len()
    + CONTEXT_GATED_CLAIM.len()
    + FIELD_CONTRADICTION.len()
    + DEGENERATE_REPETITION.len();

/// True when `domain` names one of the embedded rules
pub fn is_builtin_domain(domain: &str) -> bool {
    BUILTIN_TABLES
        .iter()
        .flat_map(|table| table.iter())
        .any(|(file_name, _)| *file_name == domain)
}

/// Load all built-in domain rules from embedded resources
///
/// Returns a vector of tuples containing (domain_id, boxed rule).
///
/// # Errors
///
/// Returns `RuleError` if:
/// - A TOML file cannot be parsed
/// - A rule definition is invalid
/// - A rule's `id` does not match the file it was embedded from
pub fn load_builtin_rules() -> Result<RuleList, RuleError> {
    let mut rules = Vec::with_capacity(BUILTIN_RULE_COUNT);

    for (file_name, toml_content) in BUILTIN_TABLES.iter().flat_map(|table| table.iter()) {
        let rule = ShapedRule::from_toml(toml_content).map_err(|e| {
            RuleError::InvalidDefinition(format!(
                "Failed to parse built-in rule '{}': {}",
                file_name, e
            ))
        })?;

        if rule.domain().as_str() != *file_name {
            return Err(RuleError::InvalidDefinition(format!(
                "Built-in rule file '{}' declares domain '{}'",
                file_name,
                rule.domain()
            )));
        }

        let domain = rule.domain().clone();
        rules.push((domain, Box::new(rule) as Box<dyn DomainRule>));
    }

    Ok(rules)
}
