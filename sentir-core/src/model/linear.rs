//! Linear bag-of-words classifier.
//!
//! Feature extraction mirrors a count/tf-idf vectorizer over the cleaned,
//! space-separated text:
//!
//! 1. Count every vocabulary n-gram within `ngram_range`
//! 2. Optionally replace counts by `1 + ln(tf)`
//! 3. Optionally multiply by the idf weight
//! 4. Optionally scale to unit L2 length
//!
//! Scores are `intercept + coef · x`. A single row is a binary logistic
//! model (`P(classes[1]) = sigmoid(score)`), otherwise softmax over rows.

use rustc_hash::FxHashMap;
use sentir_types::ClassifierError;
use smallvec::SmallVec;

use super::artifact::{FeatureNorm, ModelArtifact};
use super::classifier::Classifier;
use super::error::ModelError;

type SparseVector = SmallVec<[(u32, f64); 32]>;

/// Linear text classifier built from a validated [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct LinearTextClassifier {
    classes: Vec<String>,
    vocabulary: FxHashMap<String, u32>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    idf: Option<Vec<f64>>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<FeatureNorm>,
}

impl LinearTextClassifier {
    /// Validates `artifact` and builds the classifier.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Invalid` if shapes or values are inconsistent.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self {
            classes: artifact.classes,
            vocabulary: artifact.vocabulary,
            coef: artifact.coef,
            intercept: artifact.intercept,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    /// Vocabulary size.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn features(&self, text: &str) -> SparseVector {
        let tokens: SmallVec<[&str; 32]> = text.split_whitespace().collect();
        let mut counts: FxHashMap<u32, f64> = FxHashMap::default();
        let mut gram = String::new();

        let (lo, hi) = self.ngram_range;
        for n in lo..=hi.min(tokens.len()) {
            for window in tokens.windows(n) {
                gram.clear();
                for (i, token) in window.iter().enumerate() {
                    if i > 0 {
                        gram.push(' ');
                    }
                    gram.push_str(token);
                }
                if let Some(&index) = self.vocabulary.get(gram.as_str()) {
                    *counts.entry(index).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut features: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| {
                let mut value = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                if let Some(idf) = &self.idf {
                    value *= idf[index as usize];
                }
                (index, value)
            })
            .collect();
        // Fixed summation order keeps scores bit-for-bit reproducible.
        features.sort_unstable_by_key(|&(index, _)| index);

        if self.norm == Some(FeatureNorm::L2) {
            let length = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
            if length > 0.0 {
                for (_, value) in features.iter_mut() {
                    *value /= length;
                }
            }
        }

        features
    }

    fn scores(&self, features: &SparseVector) -> SmallVec<[f64; 4]> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| {
                bias + features
                    .iter()
                    .map(|&(index, value)| weights[index as usize] * value)
                    .sum::<f64>()
            })
            .collect()
    }

    fn probabilities(&self, text: &str) -> Vec<f64> {
        let scores = self.scores(&self.features(text));

        if scores.len() == 1 {
            let positive = sigmoid(scores[0]);
            return vec![1.0 - positive, positive];
        }

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: SmallVec<[f64; 4]> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.iter().map(|e| e / total).collect()
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

impl Classifier for LinearTextClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, batch: &[&str]) -> Result<Vec<String>, ClassifierError> {
        if batch.is_empty() {
            return Err(ClassifierError::EmptyBatch);
        }
        Ok(batch
            .iter()
            .map(|text| self.classes[argmax(&self.probabilities(text))].clone())
            .collect())
    }

    fn predict_proba(&self, batch: &[&str]) -> Result<Vec<Vec<f64>>, ClassifierError> {
        if batch.is_empty() {
            return Err(ClassifierError::EmptyBatch);
        }
        Ok(batch.iter().map(|text| self.probabilities(text)).collect())
    }
}
