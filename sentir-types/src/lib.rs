//! Core types shared across the Sentir sentiment service.
//!
//! This crate holds the value types that cross the boundary between the
//! cleaning pipeline, the inference adapter and whatever front end drives
//! them. Keeping them separate means:
//!
//! - **Stable contract**: Outcomes and error signals serialize the same way
//!   regardless of which binary produced them
//! - **Versioned cleaning**: Rule sets are named values, so a model artifact
//!   can record exactly which one it was trained against
//! - **No heavy dependencies**: Only `serde` and `thiserror`

#![warn(missing_docs)]

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places kept in a reported confidence.
pub const CONFIDENCE_DECIMALS: u32 = 4;

/// Label reported when no content survives cleaning.
pub const DEFAULT_NEUTRAL_LABEL: &str = "Neutral";

/// A single transformation step of the cleaning pipeline.
///
/// Steps always run in the order they are listed in a [`RulesetVersion`].
/// Whitespace re-joining and trimming is implicit and always runs last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleaningRule {
    /// Unicode-aware lowercasing.
    Lowercase,
    /// NFD decomposition followed by removal of combining marks.
    StripDiacritics,
    /// Removes URLs, `#hashtags` and `@mentions`.
    StripHandles,
    /// Removes every character that is neither a word character nor whitespace.
    StripPunctuation,
    /// Removes runs of digits.
    StripDigits,
    /// Drops stopwords while keeping preserved negations.
    RemoveStopwords,
}

impl CleaningRule {
    /// Short machine-readable name of the rule.
    pub const fn as_str(self) -> &'static str {
        match self {
            CleaningRule::Lowercase => "lowercase",
            CleaningRule::StripDiacritics => "strip_diacritics",
            CleaningRule::StripHandles => "strip_handles",
            CleaningRule::StripPunctuation => "strip_punctuation",
            CleaningRule::StripDigits => "strip_digits",
            CleaningRule::RemoveStopwords => "remove_stopwords",
        }
    }
}

const RULES_V1: &[CleaningRule] = &[
    CleaningRule::Lowercase,
    CleaningRule::StripHandles,
    CleaningRule::StripPunctuation,
    CleaningRule::RemoveStopwords,
];

const RULES_V2: &[CleaningRule] = &[
    CleaningRule::Lowercase,
    CleaningRule::StripDiacritics,
    CleaningRule::StripHandles,
    CleaningRule::StripPunctuation,
    CleaningRule::RemoveStopwords,
];

const RULES_V3: &[CleaningRule] = &[
    CleaningRule::Lowercase,
    CleaningRule::StripDiacritics,
    CleaningRule::StripHandles,
    CleaningRule::StripPunctuation,
    CleaningRule::StripDigits,
    CleaningRule::RemoveStopwords,
];

/// Version of the cleaning rule set.
///
/// Each later version is a superset of the previous one. A classifier only
/// gives meaningful predictions when it is fed text cleaned with the exact
/// version it was trained on, which is why model artifacts carry this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesetVersion {
    /// Lowercase, handle stripping, punctuation stripping, stopwords.
    V1,
    /// V1 plus diacritic stripping.
    V2,
    /// V2 plus digit stripping.
    V3,
}

impl Default for RulesetVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl RulesetVersion {
    /// The rule set new models are trained and served with.
    pub const CURRENT: Self = Self::V3;

    /// All known versions, oldest first.
    pub const ALL: [Self; 3] = [Self::V1, Self::V2, Self::V3];

    /// Ordered rules applied by this version.
    pub const fn rules(self) -> &'static [CleaningRule] {
        match self {
            RulesetVersion::V1 => RULES_V1,
            RulesetVersion::V2 => RULES_V2,
            RulesetVersion::V3 => RULES_V3,
        }
    }

    /// Returns `true` if this version applies `rule`.
    pub fn applies(self, rule: CleaningRule) -> bool {
        self.rules().contains(&rule)
    }

    /// Lowercase identifier (`"v1"`, `"v2"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            RulesetVersion::V1 => "v1",
            RulesetVersion::V2 => "v2",
            RulesetVersion::V3 => "v3",
        }
    }
}

impl fmt::Display for RulesetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a rule-set identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cleaning rule set {0:?} (expected v1, v2 or v3)")]
pub struct UnknownRulesetError(pub String);

impl FromStr for RulesetVersion {
    type Err = UnknownRulesetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(RulesetVersion::V1),
            "v2" | "2" => Ok(RulesetVersion::V2),
            "v3" | "3" => Ok(RulesetVersion::V3),
            _ => Err(UnknownRulesetError(s.to_string())),
        }
    }
}

/// Rounds a probability to [`CONFIDENCE_DECIMALS`] places.
///
/// Ties round half away from zero, so `0.12345` becomes `0.1235`.
/// The result is clamped to `[0, 1]`.
#[inline]
pub fn round_confidence(probability: f64) -> f64 {
    let scale = 10f64.powi(CONFIDENCE_DECIMALS as i32);
    ((probability * scale).round() / scale).clamp(0.0, 1.0)
}

/// Client-facing result of a single prediction.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentOutcome {
    label: String,
    confidence: f64,
    #[serde(skip)]
    fallback: bool,
}

impl SentimentOutcome {
    /// Creates an outcome from a raw class probability, rounding it.
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            confidence: round_confidence(probability),
            fallback: false,
        }
    }

    /// The fixed outcome for text with no analyzable content.
    pub fn neutral(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: 0.0,
            fallback: true,
        }
    }

    /// Predicted label.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Confidence in `[0, 1]`, rounded to four decimals.
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns `true` for the neutral fallback (the classifier was not consulted).
    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

impl fmt::Display for SentimentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.4})", self.label, self.confidence)
    }
}

/// Failures raised by a classifier implementation.
///
/// These carry internal detail and are only ever logged; callers see a
/// [`PredictError`] instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    /// The classifier was handed an empty batch.
    #[error("empty input batch")]
    EmptyBatch,
    /// Number of rows returned does not match the batch size.
    #[error("batch shape mismatch: expected {expected} rows, got {found}")]
    BatchShape {
        /// Rows expected (the batch size).
        expected: usize,
        /// Rows actually returned.
        found: usize,
    },
    /// Probability vector length does not match the number of classes.
    #[error("probability vector has {found} entries for {expected} classes")]
    ProbabilityShape {
        /// Number of classes.
        expected: usize,
        /// Entries in the vector.
        found: usize,
    },
    /// The predicted label is not one of the classifier's classes.
    #[error("predicted label {0:?} is not one of the classifier's classes")]
    UnknownLabel(String),
    /// A probability is NaN, infinite or outside `[0, 1]`.
    #[error("invalid probability {value} for class {label:?}")]
    InvalidProbability {
        /// Class the probability belongs to.
        label: String,
        /// Offending value.
        value: f64,
    },
    /// Probabilities do not sum to one.
    #[error("probabilities sum to {0}, expected 1.0")]
    ProbabilitySum(f64),
    /// Any other implementation-specific failure.
    #[error("{0}")]
    Internal(String),
}

/// Error signal returned to callers of the inference adapter.
///
/// Deliberately generic: the underlying cause is logged, never exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictError {
    /// No classifier is loaded.
    #[error("sentiment model is not available")]
    ModelUnavailable,
    /// The classifier failed while processing the request.
    #[error("internal error while analyzing text")]
    Internal,
}

impl PredictError {
    /// Stable machine-readable code.
    pub const fn code(self) -> &'static str {
        match self {
            PredictError::ModelUnavailable => "model_unavailable",
            PredictError::Internal => "internal",
        }
    }
}

/// Inference adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Cleaning rule set applied before classification.
    /// Must match the rule set the model was trained with.
    pub ruleset: RulesetVersion,
    /// Label returned when nothing survives cleaning.
    pub neutral_label: String,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            ruleset: RulesetVersion::CURRENT,
            neutral_label: DEFAULT_NEUTRAL_LABEL.to_string(),
        }
    }
}

impl PredictorConfig {
    /// Default configuration pinned to a specific rule set.
    pub fn with_ruleset(ruleset: RulesetVersion) -> Self {
        Self {
            ruleset,
            ..Self::default()
        }
    }
}

/// Default upper bound on a batch input, in bytes (10 MiB).
pub const DEFAULT_MAX_BATCH_BYTES: u64 = 10 * 1024 * 1024;

/// Default minimum length, in characters, of a batch text.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 10;

/// First-line keywords that mark a column header in batch files.
pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &[
    "texto",
    "text",
    "mensaje",
    "message",
    "comentario",
    "comment",
    "feedback",
];

/// Limits applied when reading a batch file (one text per line, optionally
/// a single-column CSV export).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInputConfig {
    /// Largest accepted input, in bytes.
    pub max_bytes: u64,
    /// Shorter texts are skipped.
    pub min_text_length: usize,
    /// A first line containing any of these (case-insensitive) is a header.
    pub header_keywords: Vec<String>,
}

impl Default for BatchInputConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BATCH_BYTES,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            header_keywords: DEFAULT_HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl BatchInputConfig {
    /// Rejects an input of `size` bytes if it exceeds `max_bytes`.
    pub fn check_size(&self, size: u64) -> Result<(), BatchInputError> {
        if size > self.max_bytes {
            return Err(BatchInputError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Reasons a batch input is refused before any text is classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchInputError {
    /// The input holds no bytes at all.
    #[error("batch input is empty")]
    Empty,
    /// The input exceeds the configured size limit.
    #[error("batch input is {size} bytes, the limit is {limit} bytes")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },
    /// Every line was blank, a header, or too short.
    #[error("no texts of at least {min_length} characters found")]
    NoValidTexts {
        /// Configured minimum length.
        min_length: usize,
    },
}

/// One entry of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Raw input text.
    pub text: String,
    /// Outcome or the generic failure for this text.
    pub outcome: Result<SentimentOutcome, PredictError>,
}

/// Aggregated result of a batch run.
///
/// Labels are counted as reported by the classifier, so the set of keys in
/// `label_counts` is whatever the model produces plus the neutral label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of texts processed.
    pub total_processed: usize,
    /// Texts that produced an outcome (including fallbacks).
    pub successful: usize,
    /// Texts that failed.
    pub failed: usize,
    /// Texts that collapsed to nothing under cleaning.
    pub fallbacks: usize,
    /// Successful outcomes per label.
    pub label_counts: BTreeMap<String, usize>,
    /// Per-text results in input order.
    pub results: Vec<BatchItem>,
}

impl BatchReport {
    /// Builds the report and its counters from per-text results.
    pub fn from_items(results: Vec<BatchItem>) -> Self {
        let mut report = BatchReport {
            total_processed: results.len(),
            ..Default::default()
        };

        for item in &results {
            match &item.outcome {
                Ok(outcome) => {
                    report.successful += 1;
                    if outcome.is_fallback() {
                        report.fallbacks += 1;
                    }
                    *report
                        .label_counts
                        .entry(outcome.label().to_string())
                        .or_insert(0) += 1;
                }
                Err(_) => report.failed += 1,
            }
        }

        report.results = results;
        report
    }

    /// Successful outcomes carrying `label`.
    pub fn count(&self, label: &str) -> usize {
        self.label_counts.get(label).copied().unwrap_or(0)
    }

    /// Percentage (0–100) of all processed texts labelled `label`.
    pub fn share(&self, label: &str) -> f64 {
        if self.total_processed == 0 {
            return 0.0;
        }
        self.count(label) as f64 * 100.0 / self.total_processed as f64
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} successful={} failed={} fallbacks={}",
            self.total_processed, self.successful, self.failed, self.fallbacks
        )?;
        for (label, count) in &self.label_counts {
            write!(f, " {}={}", label, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rulesets_are_supersets() {
        for pair in RulesetVersion::ALL.windows(2) {
            let (older, newer) = (pair[0], pair[1]);
            for rule in older.rules() {
                assert!(newer.applies(*rule), "{} lost {:?}", newer, rule);
            }
            assert!(newer.rules().len() > older.rules().len());
        }
    }

    #[test]
    fn rulesets_start_with_lowercase_and_end_with_stopwords() {
        for version in RulesetVersion::ALL {
            let rules = version.rules();
            assert_eq!(rules.first(), Some(&CleaningRule::Lowercase));
            assert_eq!(rules.last(), Some(&CleaningRule::RemoveStopwords));
        }
    }

    #[test]
    fn current_is_v3() {
        assert_eq!(RulesetVersion::CURRENT, RulesetVersion::V3);
        assert_eq!(RulesetVersion::default(), RulesetVersion::V3);
    }

    #[test]
    fn ruleset_parse_and_display() {
        assert_eq!("v2".parse::<RulesetVersion>(), Ok(RulesetVersion::V2));
        assert_eq!(" V3 ".parse::<RulesetVersion>(), Ok(RulesetVersion::V3));
        assert_eq!("1".parse::<RulesetVersion>(), Ok(RulesetVersion::V1));
        assert!("v9".parse::<RulesetVersion>().is_err());
        assert_eq!(RulesetVersion::V1.to_string(), "v1");
    }

    #[test]
    fn ruleset_serde_is_lowercase() {
        let json = serde_json::to_string(&RulesetVersion::V2).unwrap();
        assert_eq!(json, "\"v2\"");
        let back: RulesetVersion = serde_json::from_str("\"v3\"").unwrap();
        assert_eq!(back, RulesetVersion::V3);
    }

    #[test]
    fn rounding_half_away_from_zero() {
        assert_eq!(round_confidence(0.12345), 0.1235);
        assert_eq!(round_confidence(0.87344), 0.8734);
        assert_eq!(round_confidence(0.0), 0.0);
        assert_eq!(round_confidence(1.0), 1.0);
    }

    #[test]
    fn rounding_clamps() {
        assert_eq!(round_confidence(1.00001), 1.0);
        assert_eq!(round_confidence(-0.00001), 0.0);
    }

    #[test]
    fn outcome_rounds_on_construction() {
        let outcome = SentimentOutcome::new("Positivo", 0.873_449);
        assert_eq!(outcome.label(), "Positivo");
        assert_eq!(outcome.confidence(), 0.8734);
        assert!(!outcome.is_fallback());
    }

    #[test]
    fn neutral_outcome_is_fallback() {
        let outcome = SentimentOutcome::neutral("Neutral");
        assert_eq!(outcome.confidence(), 0.0);
        assert!(outcome.is_fallback());
    }

    #[test]
    fn outcome_json_shape() {
        let outcome = SentimentOutcome::new("Negativo", 0.5);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"label": "Negativo", "confidence": 0.5}));
    }

    #[test]
    fn predict_error_does_not_leak_detail() {
        assert_eq!(
            PredictError::Internal.to_string(),
            "internal error while analyzing text"
        );
        assert_eq!(PredictError::ModelUnavailable.code(), "model_unavailable");
        let json = serde_json::to_string(&PredictError::Internal).unwrap();
        assert_eq!(json, "\"internal\"");
    }

    #[test]
    fn default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.ruleset, RulesetVersion::V3);
        assert_eq!(config.neutral_label, "Neutral");
        assert_eq!(
            PredictorConfig::with_ruleset(RulesetVersion::V1).ruleset,
            RulesetVersion::V1
        );
    }

    #[test]
    fn rule_names() {
        let names: Vec<&str> = RulesetVersion::V1.rules().iter().map(|r| r.as_str()).collect();
        assert_eq!(
            names,
            ["lowercase", "strip_handles", "strip_punctuation", "remove_stopwords"]
        );
        assert_eq!(CleaningRule::StripDigits.as_str(), "strip_digits");
    }

    #[test]
    fn batch_input_defaults() {
        let config = BatchInputConfig::default();
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.min_text_length, 10);
        assert!(config.header_keywords.iter().any(|k| k == "texto"));
    }

    #[test]
    fn batch_input_size_limit() {
        let config = BatchInputConfig {
            max_bytes: 100,
            ..Default::default()
        };
        assert_eq!(config.check_size(100), Ok(()));
        assert_eq!(
            config.check_size(101),
            Err(BatchInputError::TooLarge {
                size: 101,
                limit: 100
            })
        );
    }

    #[test]
    fn batch_report_counts() {
        let items = vec![
            BatchItem {
                text: "me encanta".into(),
                outcome: Ok(SentimentOutcome::new("Positivo", 0.9)),
            },
            BatchItem {
                text: "horrible".into(),
                outcome: Ok(SentimentOutcome::new("Negativo", 0.8)),
            },
            BatchItem {
                text: "de la".into(),
                outcome: Ok(SentimentOutcome::neutral("Neutral")),
            },
            BatchItem {
                text: "boom".into(),
                outcome: Err(PredictError::Internal),
            },
        ];

        let report = BatchReport::from_items(items);
        assert_eq!(report.total_processed, 4);
        assert_eq!(report.successful, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.fallbacks, 1);
        assert_eq!(report.count("Positivo"), 1);
        assert_eq!(report.count("Neutral"), 1);
        assert_eq!(report.count("Mixto"), 0);
        assert_eq!(report.share("Negativo"), 25.0);
        assert_eq!(report.results.len(), 4);
    }

    #[test]
    fn empty_batch_report() {
        let report = BatchReport::from_items(Vec::new());
        assert_eq!(report.total_processed, 0);
        assert_eq!(report.share("Positivo"), 0.0);
        assert_eq!(report.to_string(), "total=0 successful=0 failed=0 fallbacks=0");
    }
}
