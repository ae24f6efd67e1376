#![forbid(unsafe_code)]

//! Pattern extraction primitives
//!
//! Every primitive scans a lowercase copy of the claim and returns *all*
//! non-overlapping matches. Nothing here fails at scan time: a missing
//! pattern is an empty vector or `false`, and rules read that as "no
//! evidence". Patterns that can fail (user supplied unit regexes,
//! vocabularies) are compiled up front by the constructors, which return
//! `RuleError`.

use crate::error::RuleError;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::LazyLock;

/// Numeric literal: optional sign, optional thousands separators, optional decimals
const NUMBER: &str = r"[-+]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|[-+]?\.\d+";

/// Optional magnitude word directly after a number ("$300k", "2.5 million")
const SCALE: &str = r"(?:\s?(?:k|thousand|million|mn|billion|bn)\b)?";

/// Units that mark a percentage
const PERCENT_UNIT: &str = r"%|percent|per cent";

/// A "word" for repetition analysis
const TOKEN: &str = r"[\p{L}\p{N}']+";

/// Sentence terminators: `.`, `!`, `?` followed by whitespace/end, or newlines
const SENTENCE_BREAK: &str = r"[.!?]+(?:\s+|$)|\n+";

static SENTENCE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SENTENCE_BREAK).expect("sentence pattern is a valid constant regex"));

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN).expect("token pattern is a valid constant regex"));

/// A range separator and a second number right after a value ("0-1", "0 to 5")
static RANGE_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-–—]|to\b)\s*[-+]?\.?\d").expect("range pattern is a valid constant regex")
});

/// A number and a range separator right before a value; a digit directly
/// before the span means the separator was absorbed as a sign ("0-1")
static RANGE_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d(?:\s*(?:[-–—]|\bto)\s*)?$").expect("range pattern is a valid constant regex")
});

/// Negation cues checked in front of a keyword
pub const DEFAULT_NEGATIONS: &[&str] = &[
    "not", "no", "never", "non", "cannot", "isn't", "aren't", "wasn't", "weren't", "doesn't",
    "don't", "didn't", "fail to", "failed to", "fails to",
];

/// How far (in characters) a negation cue may sit before the term it negates
pub const NEGATION_WINDOW: usize = 20;

/// What an extracted value represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Numeric,
    Percentage,
    KeywordMatch,
}

/// A single match produced by an extraction primitive
///
/// Extracted values are produced fresh on every call and never shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue {
    pub kind: ValueKind,
    /// Parsed number; `None` for keyword matches
    pub value: Option<f64>,
    /// The matched text (lowercased)
    pub text: String,
    /// Unit text adjacent to the number, when a unit pattern was used
    pub unit: Option<String>,
    /// Byte span in the normalized claim
    pub span: Range<usize>,
}

impl ExtractedValue {
    /// Numeric value, or NaN for keyword matches (NaN fails every comparison)
    pub fn number(&self) -> f64 {
        self.value.unwrap_or(f64::NAN)
    }

    /// Number of digits in the integer part of the matched literal
    pub fn integer_digits(&self) -> usize {
        self.text
            .trim_start_matches(['-', '+'])
            .split('.')
            .next()
            .map(|int| int.chars().filter(char::is_ascii_digit).count())
            .unwrap_or(0)
    }
}

/// A claim under audit, normalized once for all extractor calls
#[derive(Debug)]
pub struct Claim<'a> {
    original: &'a str,
    normalized: String,
}

impl<'a> Claim<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            original: text,
            normalized: text.to_lowercase(),
        }
    }

    pub fn original(&self) -> &str {
        self.original
    }

    /// The lowercase copy all patterns run against
    pub fn text(&self) -> &str {
        &self.normalized
    }

    /// Text around a span, widened by `radius` bytes and snapped to char boundaries
    pub fn window(&self, span: &Range<usize>, radius: usize) -> &str {
        let text = self.text();
        let start = floor_boundary(text, span.start.saturating_sub(radius));
        let end = ceil_boundary(text, (span.end + radius).min(text.len()));
        &text[start..end]
    }
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Distance in characters between two spans; zero when they overlap
pub fn char_gap(text: &str, a: &Range<usize>, b: &Range<usize>) -> usize {
    if a.end <= b.start {
        text[a.end..b.start].chars().count()
    } else if b.end <= a.start {
        text[b.end..a.start].chars().count()
    } else {
        0
    }
}

fn scale_factor(scale: &str) -> f64 {
    match scale.trim() {
        "k" | "thousand" => 1e3,
        "million" | "mn" => 1e6,
        "billion" | "bn" => 1e9,
        _ => 1.0,
    }
}

/// Parses a number literal, dropping a leading sign that is really a hyphen
///
/// Returns `None` when the digits are glued to a preceding letter or digit
/// ("h2o", "mp3"), which are not standalone quantities.
fn parse_number(text: &str, start: usize, literal: &str, scale: &str) -> Option<(f64, String)> {
    let preceding = text[..start].chars().next_back();
    let glued = preceding.is_some_and(|c| c.is_alphanumeric());
    let signed = literal.starts_with(['-', '+']);

    let literal = match (glued, signed) {
        (true, false) => return None,
        (true, true) => &literal[1..],
        _ => literal,
    };

    let value: f64 = literal.replace(',', "").parse().ok()?;
    Some((value * scale_factor(scale), literal.to_string()))
}

/// Which side of the number a unit marker sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPosition {
    /// "180 mpg"
    #[default]
    After,
    /// "$300k"
    Before,
}

/// Compiled matcher for numbers adjacent to a unit marker
#[derive(Debug, Clone)]
pub struct UnitPattern {
    regex: Regex,
    kind: ValueKind,
    position: UnitPosition,
}

impl UnitPattern {
    /// Compiles a unit matcher
    ///
    /// `unit` is a regex fragment (alternatives are allowed and tried left to
    /// right). `max_gap_tokens` is how many words may sit between the number
    /// and the unit.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidRegex` if `unit` is not a valid fragment.
    pub fn new(unit: &str, position: UnitPosition, max_gap_tokens: usize) -> Result<Self, RuleError> {
        let gap = format!(r"(?:[\s/-]+\p{{L}}[\p{{L}}'-]*){{0,{max_gap_tokens}}}");
        let pattern = match position {
            UnitPosition::After => format!(
                r"(?P<num>{NUMBER})(?P<scale>{SCALE}){gap}[\s/-]*(?P<unit>{unit})(?:[^\p{{L}}\p{{N}}]|$)"
            ),
            UnitPosition::Before => format!(
                r"(?P<unit>{unit}){gap}\s*(?P<num>{NUMBER})(?P<scale>{SCALE})"
            ),
        };
        let regex = Regex::new(&pattern).map_err(|e| {
            RuleError::InvalidRegex(format!("Failed to compile unit pattern '{}': {}", unit, e))
        })?;
        Ok(Self {
            regex,
            kind: ValueKind::Numeric,
            position,
        })
    }

    pub fn position(&self) -> UnitPosition {
        self.position
    }

    /// Matcher for percentages
    pub fn percent() -> Result<Self, RuleError> {
        let mut pattern = Self::new(PERCENT_UNIT, UnitPosition::After, 0)?;
        pattern.kind = ValueKind::Percentage;
        Ok(pattern)
    }

    pub fn find_all(&self, claim: &Claim) -> Vec<ExtractedValue> {
        let text = claim.text();
        let mut values = Vec::new();

        for caps in self.regex.captures_iter(text) {
            let (Some(num), Some(unit)) = (caps.name("num"), caps.name("unit")) else {
                continue;
            };
            let scale = caps.name("scale").map_or("", |m| m.as_str());
            let Some((value, literal)) = parse_number(text, num.start(), num.as_str(), scale) else {
                continue;
            };
            values.push(ExtractedValue {
                kind: self.kind,
                value: Some(value),
                text: literal,
                unit: Some(unit.as_str().to_string()),
                span: num.start()..num.end(),
            });
        }

        values
    }
}

/// Compiled matcher for every standalone number in a claim
#[derive(Debug, Clone)]
pub struct NumberPattern {
    regex: Regex,
}

impl NumberPattern {
    pub fn new() -> Self {
        let pattern = format!(r"(?P<num>{NUMBER})(?P<scale>{SCALE})");
        Self {
            regex: Regex::new(&pattern).expect("number pattern is a valid constant regex"),
        }
    }

    pub fn find_all(&self, claim: &Claim) -> Vec<ExtractedValue> {
        let text = claim.text();
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let num = caps.name("num")?;
                let scale = caps.name("scale").map_or("", |m| m.as_str());
                let (value, literal) = parse_number(text, num.start(), num.as_str(), scale)?;
                Some(ExtractedValue {
                    kind: ValueKind::Numeric,
                    value: Some(value),
                    text: literal,
                    unit: None,
                    span: num.start()..num.end(),
                })
            })
            .collect()
    }
}

impl Default for NumberPattern {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of keywords matched case-insensitively on word boundaries
#[derive(Debug, Clone)]
pub struct Vocabulary {
    regex: Regex,
    terms: Vec<String>,
}

impl Vocabulary {
    /// Compiles a vocabulary
    ///
    /// Longer terms are tried first so "statistically significant" wins over
    /// "significant" at the same position.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidDefinition` if `terms` is empty.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self, RuleError> {
        let mut terms: Vec<String> = terms
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Err(RuleError::InvalidDefinition(
                "Vocabulary must contain at least one term".to_string(),
            ));
        }
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();

        let alternatives: Vec<String> = terms.iter().map(|t| bounded(t)).collect();
        let pattern = format!("(?:{})", alternatives.join("|"));
        let regex = Regex::new(&pattern)
            .map_err(|e| RuleError::InvalidRegex(format!("Failed to compile vocabulary: {}", e)))?;

        Ok(Self { regex, terms })
    }

    /// Default negation cues
    pub fn negations() -> Self {
        Self::new(DEFAULT_NEGATIONS).expect("default negations are non-empty")
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn find_all(&self, claim: &Claim) -> Vec<ExtractedValue> {
        self.regex
            .find_iter(claim.text())
            .map(|m| ExtractedValue {
                kind: ValueKind::KeywordMatch,
                value: None,
                text: m.as_str().to_string(),
                unit: None,
                span: m.start()..m.end(),
            })
            .collect()
    }

    pub fn is_present(&self, claim: &Claim) -> bool {
        self.regex.is_match(claim.text())
    }

    pub fn matched(&self, claim: &Claim) -> BTreeSet<String> {
        self.regex
            .find_iter(claim.text())
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Matches not preceded by a negation cue within `NEGATION_WINDOW` characters
    pub fn find_unnegated(&self, claim: &Claim, negations: &Vocabulary) -> Vec<ExtractedValue> {
        let text = claim.text();
        let cues = negations.find_all(claim);
        self.find_all(claim)
            .into_iter()
            .filter(|hit| {
                !cues.iter().any(|cue| {
                    cue.span.end <= hit.span.start
                        && char_gap(text, &cue.span, &hit.span) <= NEGATION_WINDOW
                })
            })
            .collect()
    }

    /// True when any term lies within `within` characters of `span`
    pub fn is_near(&self, claim: &Claim, span: &Range<usize>, within: usize) -> bool {
        let text = claim.text();
        self.regex
            .find_iter(text)
            .any(|m| char_gap(text, &(m.start()..m.end()), span) <= within)
    }
}

/// True when the value at `span` is one end of a numeric range
pub fn is_range_endpoint(claim: &Claim, span: &Range<usize>) -> bool {
    let text = claim.text();
    RANGE_TAIL_RE.is_match(&text[span.end..]) || RANGE_HEAD_RE.is_match(&text[..span.start])
}

/// Wraps a literal term with word boundaries on the sides that start/end with a word character
fn bounded(term: &str) -> String {
    let escaped = regex::escape(term);
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let lead = if is_word(term.chars().next()) { r"\b" } else { "" };
    let trail = if is_word(term.chars().next_back()) { r"\b" } else { "" };
    format!("{lead}{escaped}{trail}")
}

/// Byte spans of sentence-like segments
pub fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BREAK_RE.find_iter(text) {
        if m.start() > start {
            spans.push(start..m.start());
        }
        start = m.end();
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

/// True when some left span and some right span share a sentence and sit
/// within `max_char_gap` characters of each other
pub fn spans_within(
    text: &str,
    lefts: &[Range<usize>],
    rights: &[Range<usize>],
    max_char_gap: usize,
) -> bool {
    if lefts.is_empty() || rights.is_empty() {
        return false;
    }
    let sentences = sentence_spans(text);
    let sentence_of = |span: &Range<usize>| {
        sentences
            .iter()
            .position(|s| s.start <= span.start && span.start < s.end)
    };

    lefts.iter().any(|l| {
        let Some(ls) = sentence_of(l) else {
            return false;
        };
        rights
            .iter()
            .any(|r| sentence_of(r) == Some(ls) && char_gap(text, l, r) <= max_char_gap)
    })
}

/// Thresholds for degenerate repetition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenTail {
    /// Sentences that must end in the same word
    pub min_sentences: usize,
    /// Absolute count a single token must reach
    pub dominant_count: usize,
    /// Share of all tokens a single token must exceed
    pub dominant_share: f64,
}

impl Default for TokenTail {
    fn default() -> Self {
        Self {
            min_sentences: 3,
            dominant_count: 10,
            dominant_share: 0.25,
        }
    }
}

impl TokenTail {
    pub fn is_degenerate(&self, claim: &Claim) -> bool {
        let text = claim.text();
        let token = &*TOKEN_RE;

        let mut tails: HashMap<&str, usize> = HashMap::new();
        for sentence in sentence_spans(text) {
            if let Some(last) = token.find_iter(&text[sentence]).last() {
                *tails.entry(last.as_str()).or_insert(0) += 1;
            }
        }
        if tails.values().any(|&n| n >= self.min_sentences) {
            return true;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut total = 0usize;
        for m in token.find_iter(text) {
            *counts.entry(m.as_str()).or_insert(0) += 1;
            total += 1;
        }
        counts.values().any(|&n| {
            n >= self.dominant_count && (n as f64) / (total as f64) > self.dominant_share
        })
    }
}

/// All numbers adjacent to `unit`; an invalid unit pattern yields no values
pub fn numbers_with_unit(text: &str, unit: &str) -> Vec<f64> {
    let claim = Claim::new(text);
    UnitPattern::new(unit, UnitPosition::After, 0)
        .map(|p| p.find_all(&claim).iter().map(ExtractedValue::number).collect())
        .unwrap_or_default()
}

/// All numbers immediately followed by a percent marker
pub fn percentages(text: &str) -> Vec<f64> {
    let claim = Claim::new(text);
    UnitPattern::percent()
        .map(|p| p.find_all(&claim).iter().map(ExtractedValue::number).collect())
        .unwrap_or_default()
}

pub fn keyword_present<S: AsRef<str>>(text: &str, vocabulary: &[S]) -> bool {
    Vocabulary::new(vocabulary).is_ok_and(|v| v.is_present(&Claim::new(text)))
}

pub fn keywords_matched<S: AsRef<str>>(text: &str, vocabulary: &[S]) -> BTreeSet<String> {
    Vocabulary::new(vocabulary)
        .map(|v| v.matched(&Claim::new(text)))
        .unwrap_or_default()
}

/// True when `left` and `right` patterns occur within `max_char_gap` characters in one sentence
pub fn windowed_contradiction(text: &str, left: &str, right: &str, max_char_gap: usize) -> bool {
    let claim = Claim::new(text);
    let (Ok(left), Ok(right)) = (Regex::new(left), Regex::new(right)) else {
        return false;
    };
    let text = claim.text();
    let spans = |re: &Regex| -> Vec<Range<usize>> {
        re.find_iter(text).map(|m| m.start()..m.end()).collect()
    };
    spans_within(text, &spans(&left), &spans(&right), max_char_gap)
}

pub fn repeated_token_tail(text: &str, min_occurrences: usize) -> bool {
    let tail = TokenTail {
        min_sentences: min_occurrences,
        ..TokenTail::default()
    };
    tail.is_degenerate(&Claim::new(text))
}
