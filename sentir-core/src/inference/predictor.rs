//! Inference adapter.
//!
//! Cleans the raw text, short-circuits degenerate input to the neutral
//! outcome, and otherwise turns the classifier's label and probability
//! vector into a rounded [`SentimentOutcome`]. Classifier failures are
//! logged here and leave as the generic [`PredictError::Internal`].

use sentir_types::{ClassifierError, PredictError, PredictorConfig, SentimentOutcome};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::analyzer::TextCleaner;
use crate::model::{Classifier, ModelError, ModelHandle};

/// Slack allowed on each probability before it counts as out of `[0, 1]`.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Slack allowed on the sum of a probability vector.
const SUM_TOLERANCE: f64 = 1e-6;

/// Readiness signal for the surrounding service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// Always `"online"` while the process is up.
    pub status: &'static str,
    /// Whether a classifier is loaded and requests can be served.
    pub model_loaded: bool,
}

/// Sentiment predictor owning its cleaner and (optionally) a model.
///
/// Immutable after construction and `Send + Sync`, so one instance can serve
/// concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct SentimentPredictor {
    cleaner: TextCleaner,
    model: Option<ModelHandle>,
    neutral_label: String,
}

impl SentimentPredictor {
    /// Creates a predictor serving `model` with the standard cleaner for
    /// `config.ruleset`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::RulesetMismatch` if the model was trained with a
    /// different rule set.
    pub fn new(config: PredictorConfig, model: ModelHandle) -> Result<Self, ModelError> {
        Self::with_cleaner(
            TextCleaner::standard(config.ruleset),
            config.neutral_label,
            model,
        )
    }

    /// Creates a predictor with a custom cleaner.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::RulesetMismatch` if the cleaner and the model
    /// disagree on the rule-set version.
    pub fn with_cleaner(
        cleaner: TextCleaner,
        neutral_label: impl Into<String>,
        model: ModelHandle,
    ) -> Result<Self, ModelError> {
        if model.ruleset() != cleaner.version() {
            return Err(ModelError::RulesetMismatch {
                trained: model.ruleset(),
                active: cleaner.version(),
            });
        }
        Ok(Self {
            cleaner,
            model: Some(model),
            neutral_label: neutral_label.into(),
        })
    }

    /// A predictor with no model. Reports not-ready and refuses every request.
    pub fn unloaded(config: PredictorConfig) -> Self {
        Self {
            cleaner: TextCleaner::standard(config.ruleset),
            model: None,
            neutral_label: config.neutral_label,
        }
    }

    /// Returns `true` if a model is loaded.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Readiness signal for health checks.
    pub fn readiness(&self) -> Readiness {
        Readiness {
            status: "online",
            model_loaded: self.is_ready(),
        }
    }

    /// The cleaner applied to every request.
    #[inline]
    pub fn cleaner(&self) -> &TextCleaner {
        &self.cleaner
    }

    /// Label used for the neutral fallback.
    #[inline]
    pub fn neutral_label(&self) -> &str {
        &self.neutral_label
    }

    /// Predicts the sentiment of `raw`.
    ///
    /// Text that cleans to nothing yields the neutral outcome with
    /// confidence `0.0` and the classifier is not called.
    ///
    /// # Errors
    ///
    /// - `PredictError::ModelUnavailable` if no model is loaded
    /// - `PredictError::Internal` if the classifier fails or returns
    ///   inconsistent output (the cause is logged, not returned)
    pub fn predict(&self, raw: &str) -> Result<SentimentOutcome, PredictError> {
        let Some(model) = &self.model else {
            warn!("prediction requested before a model was loaded");
            return Err(PredictError::ModelUnavailable);
        };

        let cleaned = self.cleaner.clean(raw);
        if cleaned.is_empty() {
            debug!(raw_len = raw.len(), "nothing left after cleaning, returning neutral outcome");
            return Ok(SentimentOutcome::neutral(self.neutral_label.as_str()));
        }

        classify(model.classifier(), &cleaned).map_err(|err| {
            error!(error = %err, cleaned = %cleaned, "classifier failed");
            PredictError::Internal
        })
    }
}

/// Runs the classifier on one cleaned text and resolves its confidence.
fn classify(classifier: &dyn Classifier, cleaned: &str) -> Result<SentimentOutcome, ClassifierError> {
    let batch = [cleaned];
    let label = single_row(classifier.predict(&batch)?)?;
    let probabilities = single_row(classifier.predict_proba(&batch)?)?;
    let confidence = resolve_confidence(classifier.classes(), &label, &probabilities)?;
    Ok(SentimentOutcome::new(label, confidence))
}

fn single_row<T>(mut rows: Vec<T>) -> Result<T, ClassifierError> {
    let found = rows.len();
    match rows.pop() {
        Some(row) if found == 1 => Ok(row),
        _ => Err(ClassifierError::BatchShape { expected: 1, found }),
    }
}

/// Probability the classifier assigned to its own predicted `label`.
///
/// Looked up by class position rather than taking the maximum, so it stays
/// correct for classifiers whose decision rule is not a plain argmax.
fn resolve_confidence(
    classes: &[String],
    label: &str,
    probabilities: &[f64],
) -> Result<f64, ClassifierError> {
    if probabilities.len() != classes.len() {
        return Err(ClassifierError::ProbabilityShape {
            expected: classes.len(),
            found: probabilities.len(),
        });
    }

    for (class, &p) in classes.iter().zip(probabilities) {
        let in_range = (-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&p);
        if !p.is_finite() || !in_range {
            return Err(ClassifierError::InvalidProbability {
                label: class.clone(),
                value: p,
            });
        }
    }

    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > SUM_TOLERANCE {
        return Err(ClassifierError::ProbabilitySum(total));
    }

    let index = classes
        .iter()
        .position(|class| class == label)
        .ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;

    Ok(probabilities[index].clamp(0.0, 1.0))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sentir_types::RulesetVersion;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Classifier returning canned output and recording what it was asked.
    pub(crate) struct StubClassifier {
        classes: Vec<String>,
        label: String,
        probabilities: Vec<f64>,
        failure: Option<ClassifierError>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl StubClassifier {
        pub(crate) fn new(classes: &[&str], label: &str, probabilities: &[f64]) -> Self {
            Self {
                classes: classes.iter().map(|c| c.to_string()).collect(),
                label: label.to_string(),
                probabilities: probabilities.to_vec(),
                failure: None,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(error: ClassifierError) -> Self {
            Self {
                failure: Some(error),
                ..Self::new(&["Negativo", "Positivo"], "Positivo", &[0.5, 0.5])
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Classifier for StubClassifier {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn predict(&self, batch: &[&str]) -> Result<Vec<String>, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .extend(batch.iter().map(|t| t.to_string()));
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            Ok(vec![self.label.clone(); batch.len()])
        }

        fn predict_proba(&self, batch: &[&str]) -> Result<Vec<Vec<f64>>, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            Ok(vec![self.probabilities.clone(); batch.len()])
        }
    }

    pub(crate) fn predictor_with(stub: Arc<StubClassifier>) -> SentimentPredictor {
        let handle = ModelHandle::from_arc(stub, RulesetVersion::CURRENT);
        SentimentPredictor::new(PredictorConfig::default(), handle).unwrap()
    }

    fn positive_stub() -> Arc<StubClassifier> {
        Arc::new(StubClassifier::new(
            &["Negativo", "Positivo"],
            "Positivo",
            &[0.1266, 0.8734],
        ))
    }

    #[test]
    fn classifies_cleaned_text() {
        let stub = positive_stub();
        let predictor = predictor_with(stub.clone());

        let outcome = predictor
            .predict("Me encanta este producto, es excelente!")
            .unwrap();

        assert_eq!(outcome.label(), "Positivo");
        assert_eq!(outcome.confidence(), 0.8734);
        assert!(!outcome.is_fallback());
        assert_eq!(stub.seen(), vec!["encanta producto excelente"]);
    }

    #[test]
    fn empty_input_is_neutral_without_classifier() {
        let stub = positive_stub();
        let predictor = predictor_with(stub.clone());

        for input in ["", "   ", "de la y el", "😀😀", "@usuario #tema https://t.co/x"] {
            let outcome = predictor.predict(input).unwrap();
            assert_eq!(outcome.label(), "Neutral");
            assert_eq!(outcome.confidence(), 0.0);
            assert!(outcome.is_fallback());
        }
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn custom_neutral_label() {
        let handle = ModelHandle::from_arc(positive_stub(), RulesetVersion::V3);
        let config = PredictorConfig {
            ruleset: RulesetVersion::V3,
            neutral_label: "Sin opinión".to_string(),
        };
        let predictor = SentimentPredictor::new(config, handle).unwrap();
        assert_eq!(predictor.predict("").unwrap().label(), "Sin opinión");
        assert_eq!(predictor.neutral_label(), "Sin opinión");
    }

    #[test]
    fn confidence_is_predicted_labels_probability_not_max() {
        // A classifier whose decision rule is not argmax.
        let stub = Arc::new(StubClassifier::new(
            &["Negativo", "Positivo"],
            "Negativo",
            &[0.3, 0.7],
        ));
        let outcome = predictor_with(stub).predict("pésimo").unwrap();
        assert_eq!(outcome.label(), "Negativo");
        assert_eq!(outcome.confidence(), 0.3);
    }

    #[test]
    fn confidence_rounds_half_away_from_zero() {
        let stub = Arc::new(StubClassifier::new(
            &["Negativo", "Positivo"],
            "Positivo",
            &[0.87655, 0.12345],
        ));
        let outcome = predictor_with(stub).predict("raro").unwrap();
        assert_eq!(outcome.confidence(), 0.1235);
    }

    #[test]
    fn open_label_set() {
        let stub = Arc::new(StubClassifier::new(
            &["ira", "alegria", "tristeza", "sorpresa"],
            "sorpresa",
            &[0.1, 0.2, 0.3, 0.4],
        ));
        let outcome = predictor_with(stub).predict("vaya").unwrap();
        assert_eq!(outcome.label(), "sorpresa");
        assert_eq!(outcome.confidence(), 0.4);
    }

    #[test]
    fn classifier_failure_is_generic_internal_error() {
        let stub = Arc::new(StubClassifier::failing(ClassifierError::Internal(
            "matrix shape (1, 5000) vs (4000,) secret detail".into(),
        )));
        let err = predictor_with(stub).predict("bueno").unwrap_err();
        assert_eq!(err, PredictError::Internal);
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn unknown_label_is_internal_error() {
        let stub = Arc::new(StubClassifier::new(
            &["Negativo", "Positivo"],
            "Mixto",
            &[0.5, 0.5],
        ));
        assert_eq!(
            predictor_with(stub).predict("bueno"),
            Err(PredictError::Internal)
        );
    }

    #[test]
    fn malformed_probabilities_are_internal_errors() {
        let cases: [&[f64]; 4] = [
            &[1.0],
            &[f64::NAN, 1.0],
            &[-0.5, 1.5],
            &[0.6, 0.6],
        ];
        for probabilities in cases {
            let stub = Arc::new(StubClassifier::new(
                &["Negativo", "Positivo"],
                "Positivo",
                probabilities,
            ));
            assert_eq!(
                predictor_with(stub).predict("bueno"),
                Err(PredictError::Internal),
                "{probabilities:?}"
            );
        }
    }

    #[test]
    fn resolve_confidence_errors() {
        let classes = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            resolve_confidence(&classes, "a", &[1.0]),
            Err(ClassifierError::ProbabilityShape {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            resolve_confidence(&classes, "c", &[0.5, 0.5]),
            Err(ClassifierError::UnknownLabel("c".into()))
        );
        assert!(matches!(
            resolve_confidence(&classes, "a", &[0.7, 0.7]),
            Err(ClassifierError::ProbabilitySum(_))
        ));
        assert_eq!(resolve_confidence(&classes, "b", &[0.25, 0.75]), Ok(0.75));
    }

    #[test]
    fn wrong_row_count_is_shape_error() {
        assert_eq!(single_row(vec![1, 2]), Err(ClassifierError::BatchShape { expected: 1, found: 2 }));
        assert_eq!(
            single_row::<u8>(Vec::new()),
            Err(ClassifierError::BatchShape { expected: 1, found: 0 })
        );
        assert_eq!(single_row(vec![7]), Ok(7));
    }

    #[test]
    fn unloaded_predictor_refuses_requests() {
        let predictor = SentimentPredictor::unloaded(PredictorConfig::default());
        assert!(!predictor.is_ready());
        assert_eq!(
            predictor.readiness(),
            Readiness {
                status: "online",
                model_loaded: false
            }
        );
        assert_eq!(predictor.predict("bueno"), Err(PredictError::ModelUnavailable));
        assert_eq!(predictor.predict(""), Err(PredictError::ModelUnavailable));
    }

    #[test]
    fn loaded_predictor_is_ready() {
        let predictor = predictor_with(positive_stub());
        assert!(predictor.is_ready());
        assert!(predictor.readiness().model_loaded);
    }

    #[test]
    fn ruleset_mismatch_rejected_at_construction() {
        let handle = ModelHandle::from_arc(positive_stub(), RulesetVersion::V1);
        let result = SentimentPredictor::new(PredictorConfig::default(), handle);
        assert!(matches!(
            result,
            Err(ModelError::RulesetMismatch {
                trained: RulesetVersion::V1,
                active: RulesetVersion::V3
            })
        ));
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let predictor = predictor_with(positive_stub());
        let first = predictor.predict("Excelente atención, muy rápido").unwrap();
        for _ in 0..10 {
            assert_eq!(predictor.predict("Excelente atención, muy rápido").unwrap(), first);
        }
    }

    #[test]
    fn concurrent_requests_share_one_model() {
        let stub = positive_stub();
        let predictor = predictor_with(stub.clone());

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let predictor = &predictor;
                scope.spawn(move || {
                    for _ in 0..25 {
                        let outcome = predictor.predict("buen producto").unwrap();
                        assert_eq!(outcome.confidence(), 0.8734);
                    }
                });
            }
        });

        // predict + predict_proba per request
        assert_eq!(stub.calls(), 8 * 25 * 2);
    }

    #[test]
    fn readiness_json() {
        let json = serde_json::to_value(predictor_with(positive_stub()).readiness()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "online", "model_loaded": true}));
    }
}
