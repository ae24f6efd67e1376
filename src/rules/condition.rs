#![forbid(unsafe_code)]

//! Conditions a domain rule is composed of
//!
//! A condition is deserialized from a `[[condition]]` table, compiled once
//! into regexes and vocabularies, and then checked against any number of
//! claims. `check` returns a short diagnostic when the condition fires.

use crate::error::RuleError;
use crate::extract::{
    Claim, ExtractedValue, NumberPattern, TokenTail, UnitPattern, UnitPosition, Vocabulary,
    char_gap, is_range_endpoint, sentence_spans, spans_within,
};
use crate::types::{Comparison, Quantifier, ZERO_EPSILON};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::ops::{Range, RangeInclusive};

const DEFAULT_WITHIN: usize = 40;
const DEFAULT_MAX_GAP: usize = 120;
const DEFAULT_ANCHOR_WITHIN: usize = 60;

fn default_within() -> usize {
    DEFAULT_WITHIN
}

fn default_max_gap() -> usize {
    DEFAULT_MAX_GAP
}

fn default_min_count() -> usize {
    1
}

fn default_anchor_within() -> usize {
    DEFAULT_ANCHOR_WITHIN
}

fn default_true() -> bool {
    true
}

/// TOML structure of a single `[[condition]]` table
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ConditionDefinition {
    UnitValue {
        unit: String,
        #[serde(default)]
        position: UnitPosition,
        #[serde(default)]
        max_gap_tokens: usize,
        op: Comparison,
        threshold: f64,
        #[serde(default)]
        quantifier: Quantifier,
        #[serde(default)]
        near: Option<Vec<String>>,
        #[serde(default = "default_within")]
        within: usize,
    },
    Percentage {
        op: Comparison,
        threshold: f64,
        #[serde(default)]
        quantifier: Quantifier,
        #[serde(default)]
        near: Option<Vec<String>>,
        #[serde(default = "default_within")]
        within: usize,
    },
    BareNumber {
        op: Comparison,
        threshold: f64,
        #[serde(default)]
        quantifier: Quantifier,
        #[serde(default)]
        near: Option<Vec<String>>,
        #[serde(default = "default_within")]
        within: usize,
        #[serde(default)]
        min_digits: Option<usize>,
        #[serde(default)]
        max_digits: Option<usize>,
        #[serde(default)]
        skip_ranges: bool,
    },
    Keyword {
        terms: Vec<String>,
        #[serde(default = "default_min_count")]
        min_count: usize,
        #[serde(default = "default_min_count")]
        min_distinct: usize,
        #[serde(default)]
        negatable: bool,
    },
    Contradiction {
        left: String,
        #[serde(default)]
        op: Option<Comparison>,
        #[serde(default)]
        threshold: Option<f64>,
        right: Vec<String>,
        #[serde(default = "default_max_gap")]
        max_gap: usize,
        #[serde(default = "default_true")]
        negatable: bool,
    },
    Tolerance {
        anchor: Vec<String>,
        #[serde(default = "default_anchor_within")]
        within: usize,
        center: f64,
        tolerance: f64,
    },
    Extremes {
        unit: String,
        #[serde(default)]
        position: UnitPosition,
        #[serde(default)]
        below: Option<f64>,
        #[serde(default)]
        above: Option<f64>,
    },
    Pair {
        pattern: String,
        op: Comparison,
    },
    ScoreGrade,
    TokenTail {
        #[serde(default)]
        min_sentences: Option<usize>,
        #[serde(default)]
        dominant_count: Option<usize>,
        #[serde(default)]
        dominant_share: Option<f64>,
    },
}

/// Where the numbers of a value condition come from
#[derive(Debug)]
pub(crate) enum ValueSource {
    Unit(UnitPattern),
    Bare(NumberPattern),
}

/// Keywords that must sit close to a value for it to count
#[derive(Debug)]
pub(crate) struct Proximity {
    vocabulary: Vocabulary,
    within: usize,
}

/// A compiled condition
#[derive(Debug)]
pub(crate) enum Condition {
    /// Quantified threshold test over extracted numbers
    Values {
        source: ValueSource,
        op: Comparison,
        threshold: f64,
        quantifier: Quantifier,
        near: Option<Proximity>,
        digits: Option<RangeInclusive<usize>>,
        skip_ranges: bool,
    },
    Keyword {
        vocabulary: Vocabulary,
        min_count: usize,
        min_distinct: usize,
        negations: Option<Vocabulary>,
    },
    Contradiction {
        left: Regex,
        test: Option<(Comparison, f64)>,
        right: Vocabulary,
        max_gap: usize,
        negations: Option<Vocabulary>,
    },
    /// The number nearest each anchor term must sit inside a band
    Tolerance {
        numbers: NumberPattern,
        anchor: Vocabulary,
        within: usize,
        center: f64,
        tolerance: f64,
    },
    /// Largest value taken as principal, smallest as payment
    Extremes {
        source: UnitPattern,
        below: Option<f64>,
        above: Option<f64>,
    },
    Pair {
        pattern: Regex,
        op: Comparison,
    },
    ScoreGrade {
        scores: Vec<Regex>,
        letter: Regex,
    },
    TokenTail(TokenTail),
}

fn compile_regex(pattern: &str, what: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|e| {
        RuleError::InvalidRegex(format!("Failed to compile {} '{}': {}", what, pattern, e))
    })
}

fn require_group(regex: &Regex, group: &str, what: &str) -> Result<(), RuleError> {
    if regex.capture_names().flatten().any(|name| name == group) {
        Ok(())
    } else {
        Err(RuleError::InvalidDefinition(format!(
            "{} pattern '{}' must define a '{}' capture group",
            what,
            regex.as_str(),
            group
        )))
    }
}

fn proximity(near: Option<Vec<String>>, within: usize) -> Result<Option<Proximity>, RuleError> {
    near.map(|terms| {
        Ok(Proximity {
            vocabulary: Vocabulary::new(&terms)?,
            within,
        })
    })
    .transpose()
}

impl Condition {
    /// Compiles a condition definition
    ///
    /// # Errors
    ///
    /// Returns `RuleError` if a pattern fails to compile, a vocabulary is
    /// empty, or a definition is internally inconsistent.
    pub(crate) fn compile(def: ConditionDefinition) -> Result<Self, RuleError> {
        let condition = match def {
            ConditionDefinition::UnitValue {
                unit,
                position,
                max_gap_tokens,
                op,
                threshold,
                quantifier,
                near,
                within,
            } => Condition::Values {
                source: ValueSource::Unit(UnitPattern::new(&unit, position, max_gap_tokens)?),
                op,
                threshold,
                quantifier,
                near: proximity(near, within)?,
                digits: None,
                skip_ranges: false,
            },
            ConditionDefinition::Percentage {
                op,
                threshold,
                quantifier,
                near,
                within,
            } => Condition::Values {
                source: ValueSource::Unit(UnitPattern::percent()?),
                op,
                threshold,
                quantifier,
                near: proximity(near, within)?,
                digits: None,
                skip_ranges: false,
            },
            ConditionDefinition::BareNumber {
                op,
                threshold,
                quantifier,
                near,
                within,
                min_digits,
                max_digits,
                skip_ranges,
            } => {
                let digits = match (min_digits, max_digits) {
                    (None, None) => None,
                    (min, max) => Some(min.unwrap_or(1)..=max.unwrap_or(usize::MAX)),
                };
                Condition::Values {
                    source: ValueSource::Bare(NumberPattern::new()),
                    op,
                    threshold,
                    quantifier,
                    near: proximity(near, within)?,
                    digits,
                    skip_ranges,
                }
            }
            ConditionDefinition::Keyword {
                terms,
                min_count,
                min_distinct,
                negatable,
            } => Condition::Keyword {
                vocabulary: Vocabulary::new(&terms)?,
                min_count: min_count.max(1),
                min_distinct: min_distinct.max(1),
                negations: negatable.then(Vocabulary::negations),
            },
            ConditionDefinition::Contradiction {
                left,
                op,
                threshold,
                right,
                max_gap,
                negatable,
            } => {
                let left = compile_regex(&left, "contradiction pattern")?;
                let test = match (op, threshold) {
                    (Some(op), Some(threshold)) => {
                        require_group(&left, "value", "Contradiction")?;
                        Some((op, threshold))
                    }
                    (None, None) => None,
                    _ => {
                        return Err(RuleError::InvalidDefinition(
                            "Contradiction 'op' and 'threshold' must be given together"
                                .to_string(),
                        ));
                    }
                };
                Condition::Contradiction {
                    left,
                    test,
                    right: Vocabulary::new(&right)?,
                    max_gap,
                    negations: negatable.then(Vocabulary::negations),
                }
            }
            ConditionDefinition::Tolerance {
                anchor,
                within,
                center,
                tolerance,
            } => Condition::Tolerance {
                numbers: NumberPattern::new(),
                anchor: Vocabulary::new(&anchor)?,
                within,
                center,
                tolerance,
            },
            ConditionDefinition::Extremes {
                unit,
                position,
                below,
                above,
            } => {
                if below.is_none() && above.is_none() {
                    return Err(RuleError::InvalidDefinition(
                        "Extremes condition needs 'below' or 'above'".to_string(),
                    ));
                }
                Condition::Extremes {
                    source: UnitPattern::new(&unit, position, 0)?,
                    below,
                    above,
                }
            }
            ConditionDefinition::Pair { pattern, op } => {
                let pattern = compile_regex(&pattern, "pair pattern")?;
                require_group(&pattern, "first", "Pair")?;
                require_group(&pattern, "second", "Pair")?;
                Condition::Pair { pattern, op }
            }
            ConditionDefinition::ScoreGrade => Condition::ScoreGrade {
                scores: vec![
                    compile_regex(
                        r"(?P<score>\d{1,3}(?:\.\d+)?)\s*(?:%|/\s*100\b|points?\b|out of 100\b)",
                        "score pattern",
                    )?,
                    compile_regex(
                        r"\bscored?\s*(?:of|is|was|:|=)?\s*(?P<score>\d{1,3}(?:\.\d+)?)",
                        "score pattern",
                    )?,
                ],
                letter: compile_regex(
                    r#"\bgrade\s*(?:of|is|was|:|=)?\s*(?:an?\s+)?["']?(?P<letter>[a-f])[+-]?(?:[^\p{L}\p{N}]|$)"#,
                    "grade pattern",
                )?,
            },
            ConditionDefinition::TokenTail {
                min_sentences,
                dominant_count,
                dominant_share,
            } => {
                let defaults = TokenTail::default();
                Condition::TokenTail(TokenTail {
                    min_sentences: min_sentences.unwrap_or(defaults.min_sentences),
                    dominant_count: dominant_count.unwrap_or(defaults.dominant_count),
                    dominant_share: dominant_share.unwrap_or(defaults.dominant_share),
                })
            }
        };
        Ok(condition)
    }

    /// Checks the condition, returning a diagnostic when it fires
    pub(crate) fn check(&self, claim: &Claim) -> Option<String> {
        match self {
            Condition::Values {
                source,
                op,
                threshold,
                quantifier,
                near,
                digits,
                skip_ranges,
            } => {
                let values = collect_values(claim, source, near.as_ref(), digits.as_ref())
                    .into_iter()
                    .filter(|v| !*skip_ranges || !is_range_endpoint(claim, &v.span))
                    .collect::<Vec<_>>();
                let holds = |v: &ExtractedValue| op.holds(v.number(), *threshold);
                if !quantifier.apply(&values, holds) {
                    return None;
                }
                let witness = values.iter().find(|v| holds(*v))?;
                let position = match source {
                    ValueSource::Unit(pattern) => pattern.position(),
                    ValueSource::Bare(_) => UnitPosition::After,
                };
                let quantity = match (witness.unit.as_deref().map(str::trim), position) {
                    (Some(unit), UnitPosition::Before) => format!("{}{}", unit, witness.text),
                    (Some(unit), UnitPosition::After) => format!("{} {}", witness.text, unit),
                    (None, _) => witness.text.clone(),
                };
                Some(format!("{} {} {}", quantity, op.symbol(), threshold))
            }
            Condition::Keyword {
                vocabulary,
                min_count,
                min_distinct,
                negations,
            } => {
                let hits = match negations {
                    Some(negations) => vocabulary.find_unnegated(claim, negations),
                    None => vocabulary.find_all(claim),
                };
                let distinct: BTreeSet<&str> = hits.iter().map(|h| h.text.as_str()).collect();
                if hits.len() < *min_count || distinct.len() < *min_distinct {
                    return None;
                }
                Some(if *min_distinct > 1 {
                    distinct
                        .iter()
                        .map(|t| format!("'{}'", t))
                        .collect::<Vec<_>>()
                        .join(", ")
                } else if *min_count > 1 {
                    format!("'{}' x{}", hits[0].text, hits.len())
                } else {
                    format!("'{}'", hits[0].text)
                })
            }
            Condition::Contradiction {
                left,
                test,
                right,
                max_gap,
                negations,
            } => {
                let text = claim.text();
                let lefts: Vec<(Range<usize>, String)> = left
                    .captures_iter(text)
                    .filter_map(|caps| {
                        let whole = caps.get(0)?;
                        if let Some((op, threshold)) = test {
                            let value: f64 = caps.name("value")?.as_str().parse().ok()?;
                            if !op.holds(value, *threshold) {
                                return None;
                            }
                        }
                        Some((whole.start()..whole.end(), whole.as_str().trim().to_string()))
                    })
                    .collect();
                let rights: Vec<ExtractedValue> = match negations {
                    Some(negations) => right.find_unnegated(claim, negations),
                    None => right.find_all(claim),
                };

                lefts.iter().find_map(|(span, literal)| {
                    rights
                        .iter()
                        .find(|r| {
                            spans_within(
                                text,
                                std::slice::from_ref(span),
                                std::slice::from_ref(&r.span),
                                *max_gap,
                            )
                        })
                        .map(|r| format!("'{}' alongside '{}'", literal, r.text))
                })
            }
            Condition::Tolerance {
                numbers,
                anchor,
                within,
                center,
                tolerance,
            } => anchored_values(claim, numbers, anchor, *within)
                .into_iter()
                .find(|v| (v - center).abs() > *tolerance)
                .map(|v| format!("|{} - {}| > {}", v, center, tolerance)),
            Condition::Extremes {
                source,
                below,
                above,
            } => {
                let values: Vec<f64> = source.find_all(claim).iter().map(|v| v.number()).collect();
                let principal = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let payment = values.iter().copied().fold(f64::INFINITY, f64::min);
                if values.len() < 2 || principal <= 0.0 || (principal - payment).abs() < ZERO_EPSILON
                {
                    return None;
                }
                let ratio = payment / principal;
                let fired = below.is_some_and(|b| ratio < b) || above.is_some_and(|a| ratio > a);
                fired.then(|| format!("payment {} vs principal {} (ratio {:.5})", payment, principal, ratio))
            }
            Condition::Pair { pattern, op } => {
                pattern.captures_iter(claim.text()).find_map(|caps| {
                    let first: f64 = caps.name("first")?.as_str().parse().ok()?;
                    let second: f64 = caps.name("second")?.as_str().parse().ok()?;
                    op.holds(first, second)
                        .then(|| format!("{} {} {}", first, op.symbol(), second))
                })
            }
            Condition::ScoreGrade { scores, letter } => {
                let text = claim.text();
                let scores: Vec<f64> = scores
                    .iter()
                    .flat_map(|re| re.captures_iter(text))
                    .filter_map(|caps| caps.name("score")?.as_str().parse::<f64>().ok())
                    .filter(|s| (0.0..=100.0).contains(s))
                    .collect();
                let letters: Vec<char> = letter
                    .captures_iter(text)
                    .filter_map(|caps| caps.name("letter")?.as_str().chars().next())
                    .collect();
                scores.iter().find_map(|&score| {
                    let expected = letter_for_score(score);
                    letters
                        .iter()
                        .map(|&l| if l == 'e' { 'f' } else { l })
                        .find(|&l| l != expected)
                        .map(|l| format!("score {} graded '{}' (expected '{}')", score, l, expected))
                })
            }
            Condition::TokenTail(tail) => tail
                .is_degenerate(claim)
                .then(|| "degenerate token repetition".to_string()),
        }
    }
}

fn collect_values(
    claim: &Claim,
    source: &ValueSource,
    near: Option<&Proximity>,
    digits: Option<&RangeInclusive<usize>>,
) -> Vec<ExtractedValue> {
    let values = match source {
        ValueSource::Unit(pattern) => pattern.find_all(claim),
        ValueSource::Bare(pattern) => pattern.find_all(claim),
    };
    values
        .into_iter()
        .filter(|v| digits.is_none_or(|d| d.contains(&v.integer_digits())))
        .filter(|v| near.is_none_or(|p| p.vocabulary.is_near(claim, &v.span, p.within)))
        .collect()
}

/// For each anchor term, the closest number in its sentence within `within`
/// characters
///
/// Numbers with a fractional part win over integers, so a digit count
/// ("pi to 5 places is 3.14159") does not stand in for the value.
fn anchored_values(
    claim: &Claim,
    numbers: &NumberPattern,
    anchor: &Vocabulary,
    within: usize,
) -> Vec<f64> {
    let text = claim.text();
    let sentences = sentence_spans(text);
    let values = numbers.find_all(claim);

    anchor
        .find_all(claim)
        .iter()
        .filter_map(|hit| {
            let sentence = sentences
                .iter()
                .find(|s| s.start <= hit.span.start && hit.span.start < s.end)?;
            let nearby: Vec<&ExtractedValue> = values
                .iter()
                .filter(|v| sentence.start <= v.span.start && v.span.end <= sentence.end)
                .filter(|v| char_gap(text, &hit.span, &v.span) <= within)
                .collect();
            let fractional = |v: &&ExtractedValue| v.text.contains('.');
            let pool: Vec<&ExtractedValue> = if nearby.iter().any(fractional) {
                nearby.into_iter().filter(fractional).collect()
            } else {
                nearby
            };
            pool.into_iter()
                .min_by_key(|v| char_gap(text, &hit.span, &v.span))
                .map(ExtractedValue::number)
        })
        .collect()
}

/// Letter grade on the usual 90/80/70/60 bands
fn letter_for_score(score: f64) -> char {
    match score {
        s if s >= 90.0 => 'a',
        s if s >= 80.0 => 'b',
        s if s >= 70.0 => 'c',
        s if s >= 60.0 => 'd',
        _ => 'f',
    }
}
