//! Behavioral tests for the builtin domain catalog
//!
//! Every builtin domain gets one reply it must flag and one nearby reply it
//! must accept, followed by the headline examples and engine-wide
//! properties (determinism, no evidence means not misled).

#[macro_use]
mod common;

use common::TestResult;
use veracity::engine::{AuditEngine, AuditStatus};
use veracity::rules::builtin::BUILTIN_RULE_COUNT;
use veracity::{AuditError, RuleRegistry};

/// (domain, misleading reply, acceptable reply)
const CASES: &[(&str, &str, &str)] = &[
    // magnitude-too-extreme
    (
        "battery_life",
        "The phone battery lasts 72 hours on a single charge.",
        "The phone battery lasts 20 hours on a single charge.",
    ),
    (
        "body_temperature",
        "The patient had a fever of 47 degrees Celsius.",
        "The patient had a fever of 38.5 degrees Celsius.",
    ),
    (
        "calorie_content",
        "One slice of this cake has 5000 calories.",
        "One slice of this cake has 450 calories.",
    ),
    (
        "constant_pi",
        "The value of pi is 3.19160.",
        "The value of pi is 3.14200.",
    ),
    (
        "earthquake_magnitude",
        "The earthquake had a magnitude of 12.5 on the Richter scale.",
        "The earthquake had a magnitude of 7.8 on the Richter scale.",
    ),
    (
        "fuel_efficiency",
        "This sedan gets 180 mpg.",
        "This sedan gets 38 mpg.",
    ),
    (
        "heart_rate",
        "Her resting heart rate is 300 bpm.",
        "Her resting heart rate is 72 bpm.",
    ),
    (
        "human_age",
        "The oldest woman lived to be 160 years old.",
        "The oldest woman lived to be 97 years old.",
    ),
    (
        "human_height",
        "He stands 300 cm tall.",
        "He stands 190 cm tall.",
    ),
    (
        "hurricane_category",
        "The hurricane was upgraded to Category 7 overnight.",
        "The hurricane was upgraded to Category 4 overnight.",
    ),
    (
        "inflation_rate",
        "Annual inflation in Germany reached 80% last year.",
        "Annual inflation in Germany reached 2.5% last year.",
    ),
    (
        "internet_speed",
        "My home broadband plan delivers 500 Gbps.",
        "My home broadband plan delivers 1 Gbps.",
    ),
    (
        "iq_score",
        "He has an IQ of 250.",
        "He has an IQ of 110.",
    ),
    (
        "model_accuracy",
        "Our model achieves 120% accuracy on the test set.",
        "Our model achieves 92% accuracy on the test set.",
    ),
    (
        "restaurant_rating",
        "This restaurant is rated 7 stars.",
        "This restaurant is rated 4.5 out of 5.",
    ),
    (
        "salary",
        "The average nurse salary in Ohio is $2.5 million.",
        "The average nurse salary in Ohio is $62,000.",
    ),
    (
        "sleep_duration",
        "Adults should sleep 22 hours a night.",
        "Adults should sleep 8 hours a night.",
    ),
    (
        "stock_price_change",
        "Apple stock rose 400% in one day.",
        "Apple stock rose 2% today.",
    ),
    (
        "uv_index",
        "The UV index today is 25.",
        "The UV index today is 7.",
    ),
    (
        "vaccine_efficacy",
        "The vaccine has 150% efficacy against infection.",
        "The vaccine has 95% efficacy against infection.",
    ),
    (
        "weather_temperature",
        "Tomorrow's forecast calls for a high of 75°C.",
        "Tomorrow's forecast calls for a high of 24°C.",
    ),
    // magnitude-too-low
    (
        "airfare",
        "Round-trip flights from New York to London cost $5.",
        "Round-trip flights from New York to London cost $650.",
    ),
    (
        "crypto_price",
        "Bitcoin is trading at $0.50 today.",
        "Bitcoin is trading at $67,000 today.",
    ),
    (
        "electricity_price",
        "Electricity costs $0.01 per kWh.",
        "Electricity costs $0.15 per kWh.",
    ),
    (
        "flight_duration",
        "A nonstop flight from New York to Tokyo takes 2 hours.",
        "A nonstop flight from New York to Tokyo takes 14 hours.",
    ),
    (
        "gas_price",
        "Gas costs $0.10 per gallon right now.",
        "Gas costs $3.45 per gallon right now.",
    ),
    (
        "house_price",
        "A three-bedroom house in San Francisco is priced at $900.",
        "A three-bedroom house in San Francisco is priced at $1.4 million.",
    ),
    (
        "loan_payment",
        "On a $300,000 mortgage, the monthly payment is $12.",
        "On a $300,000 mortgage, the monthly payment is $1,800.",
    ),
    (
        "mortgage_rate",
        "The average 30-year mortgage rate is 0.5% this week.",
        "The average 30-year mortgage rate is 6.8% this week.",
    ),
    // zero-as-red-flag
    (
        "annual_rainfall",
        "Seattle gets 0 mm of rainfall per year.",
        "Seattle gets 950 mm of rainfall per year.",
    ),
    (
        "covid_cases",
        "In 2021, Italy reported 0 COVID cases.",
        "In 2021, Italy reported 4,000,000 COVID cases.",
    ),
    (
        "crime_rate",
        "New York City recorded 0 homicides last year.",
        "New York City recorded 386 homicides last year.",
    ),
    (
        "fraud_detection",
        "There is a 0.0 chance of fraud on this account.",
        "There is a 0.32 chance of fraud on this account.",
    ),
    (
        "stock_volatility",
        "Tesla stock has 0% volatility.",
        "Tesla stock has 45% annualized volatility.",
    ),
    (
        "unemployment_rate",
        "The unemployment rate in Spain is 0%.",
        "The unemployment rate in Spain is 11.7%.",
    ),
    // context-gated-claim
    (
        "air_quality",
        "The air quality in Beijing is good today.",
        "The air quality in Reykjavik is excellent.",
    ),
    (
        "drinking_water",
        "The tap water in Flint has high lead levels but it is perfectly safe to drink.",
        "The tap water in Flint has high lead levels and is not safe to drink.",
    ),
    (
        "fire_risk",
        "Despite the drought and high winds, the wildfire risk is low this week.",
        "Because of the drought, the wildfire danger is extreme.",
    ),
    (
        "password_strength",
        "password123 is a strong password.",
        "password123 is not a strong password.",
    ),
    (
        "snowfall_forecast",
        "Expect heavy snow in Miami this weekend.",
        "Expect sunshine in Miami this weekend, with no snow.",
    ),
    // field-contradiction
    (
        "blood_pressure",
        "Her blood pressure is 80/120 mmHg.",
        "Her blood pressure is 120/80 mmHg.",
    ),
    (
        "grade_conversion",
        "You scored 95 out of 100, which is a grade of C.",
        "You scored 95 out of 100, which is a grade of A.",
    ),
    (
        "p_value_significance",
        "The p-value was 0.20, so the result is statistically significant.",
        "The p-value was 0.01, so the result is statistically significant.",
    ),
    // degenerate-repetition
    (
        "prompt_extension",
        "I like cats. You like cats. We all like cats.",
        "I like cats. You prefer dogs. We all like birds.",
    ),
    (
        "sentiment",
        "The review is positive positive positive.",
        "The review is positive overall.",
    ),
];

fn engine() -> AuditEngine {
    assert_ok!(AuditEngine::with_builtin_rules(), "builtin rules must load")
}

#[test]
fn test_cases_cover_every_builtin_domain() {
    let registry = assert_ok!(RuleRegistry::with_builtin_rules());
    let mut covered: Vec<&str> = CASES.iter().map(|(domain, _, _)| *domain).collect();
    covered.sort_unstable();
    covered.dedup();

    let registered: Vec<&str> = registry.domains().iter().map(|d| d.as_str()).collect();
    assert_eq!(covered, registered);
    assert_eq!(covered.len(), BUILTIN_RULE_COUNT);
}

#[test]
fn test_every_domain_flags_its_misleading_reply() {
    let engine = engine();
    for (domain, misleading, _) in CASES {
        let result = assert_ok!(engine.audit(domain, misleading));
        assert!(
            result.misled,
            "{} should flag {:?}, got {:?}",
            domain, misleading, result
        );
        assert_eq!(result.status, AuditStatus::Misled);
        assert!(result.diagnostic.is_some(), "{} gave no diagnostic", domain);
    }
}

#[test]
fn test_every_domain_accepts_its_plausible_reply() {
    let engine = engine();
    for (domain, _, plausible) in CASES {
        let result = assert_ok!(engine.audit(domain, plausible));
        assert!(
            !result.misled,
            "{} should accept {:?}, got {:?}",
            domain, plausible, result
        );
        assert_eq!(result.status, AuditStatus::NotMisled);
    }
}

#[test]
fn test_no_evidence_is_never_misled() {
    let engine = engine();
    let replies = [
        "",
        "   ",
        "I'm not sure, could you rephrase the question?",
        "Hello! How can I help you today?",
    ];
    for domain in engine.registry().domains() {
        for reply in replies {
            let result = assert_ok!(engine.audit(domain.as_str(), reply));
            assert!(!result.misled, "{} flagged {:?}", domain, reply);
        }
    }
}

#[test]
fn test_audit_is_deterministic() {
    let engine = engine();
    for (domain, misleading, plausible) in CASES {
        for reply in [misleading, plausible] {
            let first = assert_ok!(engine.audit(domain, reply));
            let second = assert_ok!(engine.audit(domain, reply));
            assert_eq!(first, second);
        }
    }
}

#[test]
fn test_pi_examples() -> TestResult {
    let engine = engine();
    assert!(engine.audit("constant_pi", "pi = 3.19160")?.misled);
    assert!(!engine.audit("constant_pi", "pi = 3.14200")?.misled);
    Ok(())
}

#[test]
fn test_pi_short_and_integer_values() -> TestResult {
    let engine = engine();
    for reply in ["Pi is 3.2.", "Pi is approximately 3.5.", "Pi equals 4."] {
        assert!(engine.audit("constant_pi", reply)?.misled, "{}", reply);
    }
    Ok(())
}

#[test]
fn test_pi_ignores_other_constants() -> TestResult {
    let engine = engine();
    let result = engine.audit(
        "constant_pi",
        "Pi is 3.14159 and Euler's number e is 2.71828.",
    )?;
    assert!(!result.misled, "{:?}", result.diagnostic);
    Ok(())
}

#[test]
fn test_air_quality_examples() -> TestResult {
    let engine = engine();
    assert!(engine.audit("air_quality", "Air quality in Beijing today is Good.")?.misled);
    assert!(!engine.audit("air_quality", "Air quality in Reykjavik today is Good.")?.misled);
    assert!(
        !engine
            .audit("air_quality", "Air quality in Beijing today is not good.")?
            .misled
    );
    Ok(())
}

#[test]
fn test_significance_examples() -> TestResult {
    let engine = engine();
    let result = engine.audit(
        "p_value_significance",
        "p-value = 0.20, but the result is statistically significant",
    )?;
    assert!(result.misled);
    assert_eq!(
        result.diagnostic.as_deref(),
        Some("'p-value = 0.20' alongside 'statistically significant'")
    );

    assert!(
        !engine
            .audit("p_value_significance", "p-value = 0.01, statistically significant")?
            .misled
    );
    Ok(())
}

#[test]
fn test_fraud_examples() -> TestResult {
    let engine = engine();
    assert!(engine.audit("fraud_detection", "The probability of fraud is 0.0")?.misled);
    assert!(engine.audit("fraud_detection", "There is no chance of fraud")?.misled);
    assert!(!engine.audit("fraud_detection", "The probability of fraud is 0.32")?.misled);
    Ok(())
}

#[test]
fn test_fraud_scale_endpoint_is_not_a_zero_claim() -> TestResult {
    let engine = engine();
    assert!(
        !engine
            .audit("fraud_detection", "The fraud score is 0.32 on a 0-1 scale.")?
            .misled
    );
    Ok(())
}

#[test]
fn test_fuel_efficiency_examples() -> TestResult {
    let engine = engine();
    let result = engine.audit("fuel_efficiency", "The car gets 180 mpg.")?;
    assert!(result.misled);
    assert_eq!(result.diagnostic.as_deref(), Some("180 mpg >= 150"));
    assert!(!engine.audit("fuel_efficiency", "The car gets 38 mpg.")?.misled);
    Ok(())
}

#[test]
fn test_unknown_domain() {
    let engine = engine();
    assert_eq!(
        engine.audit("not_a_domain", "anything"),
        Err(AuditError::UnknownDomain("not_a_domain".to_string()))
    );
}

#[test]
fn test_loan_ratio_flags_implausibly_high_payment() -> TestResult {
    let engine = engine();
    let result = engine.audit(
        "loan_payment",
        "For a $10,000 loan the monthly payment is $5,000.",
    )?;
    assert!(result.misled);
    Ok(())
}

#[test]
fn test_crime_rate_counts_any_small_zero() -> TestResult {
    // Any standalone zero in a megacity crime reply fires, even when it does
    // not describe the crime count itself
    let engine = engine();
    let result = engine.audit(
        "crime_rate",
        "Chicago crime dropped after 0 new precincts were added.",
    )?;
    assert!(result.misled);
    Ok(())
}

#[test]
fn test_flight_duration_requires_city_pair() -> TestResult {
    let engine = engine();
    assert!(
        !engine
            .audit("flight_duration", "The flight to Tokyo takes 2 hours.")?
            .misled
    );
    Ok(())
}

#[test]
fn test_flight_duration_needs_two_distinct_cities() -> TestResult {
    let engine = engine();
    assert!(
        !engine
            .audit(
                "flight_duration",
                "The nonstop flight over New York takes 2 hours; New York is lovely.",
            )?
            .misled
    );
    let result = engine.audit(
        "flight_duration",
        "The nonstop flight from London to New York takes 2 hours.",
    )?;
    assert!(result.misled);
    assert_eq!(
        result.diagnostic.as_deref(),
        Some("'london', 'new york'; 2 hours < 3")
    );
    Ok(())
}

#[test]
fn test_spelled_out_degree_units() -> TestResult {
    let engine = engine();
    assert!(
        engine
            .audit("body_temperature", "The patient's fever reached 45°Celsius.")?
            .misled
    );
    assert!(
        engine
            .audit("body_temperature", "The patient's fever reached 45 °Celsius.")?
            .misled
    );
    assert!(
        engine
            .audit("weather_temperature", "The forecast high is 150°Fahrenheit.")?
            .misled
    );
    assert!(
        !engine
            .audit("weather_temperature", "The forecast high is 75°Fahrenheit.")?
            .misled
    );
    Ok(())
}

#[test]
fn test_case_insensitive_matching() -> TestResult {
    let engine = engine();
    assert!(engine.audit("heart_rate", "HEART RATE: 300 BPM")?.misled);
    assert!(engine.audit("sentiment", "POSITIVE. Positive! positive?")?.misled);
    Ok(())
}
