//! On-disk model artifact.
//!
//! A JSON document describing a linear bag-of-words classifier together
//! with the cleaning rule set its training data went through:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "ruleset": "v3",
//!   "classes": ["Negativo", "Neutral", "Positivo"],
//!   "vocabulary": {"encanta": 0, "horrible": 1},
//!   "coef": [[-1.0, 2.0], [0.0, 0.0], [2.0, -1.0]],
//!   "intercept": [0.0, 0.1, 0.0],
//!   "idf": [1.2, 1.7],
//!   "ngram_range": [1, 2],
//!   "sublinear_tf": false,
//!   "norm": "l2"
//! }
//! ```
//!
//! Binary models may carry a single `coef` row (logistic); otherwise there
//! is one row per class (softmax).

use rustc_hash::FxHashMap;
use sentir_types::RulesetVersion;
use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// Artifact format understood by this crate.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Longest n-gram a model may use.
pub const MAX_NGRAM: usize = 3;

/// Feature vector normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureNorm {
    /// Scale to unit Euclidean length.
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Deserialized model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Must equal [`ARTIFACT_FORMAT_VERSION`].
    pub format_version: u32,
    /// Rule set the training text was cleaned with.
    pub ruleset: RulesetVersion,
    /// Class labels, in coefficient row order.
    pub classes: Vec<String>,
    /// Term (or space-joined n-gram) to feature index.
    pub vocabulary: FxHashMap<String, u32>,
    /// Per-class weights, `[rows][features]`.
    pub coef: Vec<Vec<f64>>,
    /// Per-row bias.
    pub intercept: Vec<f64>,
    /// Optional inverse document frequency per feature.
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    /// Inclusive n-gram range.
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Use `1 + ln(tf)` instead of raw counts.
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Feature vector normalization.
    #[serde(default)]
    pub norm: Option<FeatureNorm>,
}

impl ModelArtifact {
    /// Parses an artifact from JSON bytes without validating it.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Number of features (vocabulary size).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Checks that every part of the artifact agrees on shapes and values.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::invalid(format!(
                "unsupported format_version {} (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        self.validate_classes()?;

        let n_classes = self.classes.len();
        let rows = self.coef.len();
        let rows_ok = rows == n_classes || (n_classes == 2 && rows == 1);
        if !rows_ok {
            return Err(ModelError::invalid(format!(
                "coef has {rows} rows for {n_classes} classes"
            )));
        }
        if self.intercept.len() != rows {
            return Err(ModelError::invalid(format!(
                "intercept has {} entries for {rows} coef rows",
                self.intercept.len()
            )));
        }

        let n_features = self.n_features();
        if n_features == 0 {
            return Err(ModelError::invalid("vocabulary is empty"));
        }
        for (row, weights) in self.coef.iter().enumerate() {
            if weights.len() != n_features {
                return Err(ModelError::invalid(format!(
                    "coef row {row} has {} weights for {n_features} features",
                    weights.len()
                )));
            }
        }
        self.validate_vocabulary()?;

        if let Some(idf) = &self.idf {
            if idf.len() != n_features {
                return Err(ModelError::invalid(format!(
                    "idf has {} entries for {n_features} features",
                    idf.len()
                )));
            }
            if idf.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ModelError::invalid("idf contains a negative or non-finite weight"));
            }
        }

        let non_finite = self
            .coef
            .iter()
            .flatten()
            .chain(self.intercept.iter())
            .any(|w| !w.is_finite());
        if non_finite {
            return Err(ModelError::invalid("coef or intercept contains a non-finite weight"));
        }

        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi || hi > MAX_NGRAM {
            return Err(ModelError::invalid(format!(
                "ngram_range ({lo}, {hi}) must satisfy 1 <= min <= max <= {MAX_NGRAM}"
            )));
        }

        Ok(())
    }

    fn validate_classes(&self) -> Result<(), ModelError> {
        if self.classes.len() < 2 {
            return Err(ModelError::invalid(format!(
                "at least two classes are required, found {}",
                self.classes.len()
            )));
        }
        for (i, class) in self.classes.iter().enumerate() {
            if class.trim().is_empty() {
                return Err(ModelError::invalid(format!("class {i} has an empty label")));
            }
            if self.classes[..i].contains(class) {
                return Err(ModelError::invalid(format!("duplicate class label {class:?}")));
            }
        }
        Ok(())
    }

    fn validate_vocabulary(&self) -> Result<(), ModelError> {
        let n_features = self.n_features();
        let mut seen = vec![false; n_features];
        for (term, &index) in &self.vocabulary {
            let slot = seen.get_mut(index as usize).ok_or_else(|| {
                ModelError::invalid(format!(
                    "vocabulary term {term:?} has index {index} >= {n_features}"
                ))
            })?;
            if *slot {
                return Err(ModelError::invalid(format!(
                    "vocabulary index {index} is used more than once"
                )));
            }
            *slot = true;
        }
        Ok(())
    }
}
