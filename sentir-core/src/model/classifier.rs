//! Classifier contract and the shared model handle.

use std::fmt;
use std::sync::Arc;

use sentir_types::{ClassifierError, RulesetVersion};

/// A complete text classification pipeline.
///
/// Implementations do their own feature extraction: they receive cleaned
/// text and return labels and probabilities. Both methods take a batch and
/// must return exactly one row per input.
///
/// The trait requires `Send + Sync` because one instance is shared by every
/// request. Implementations must be safe for concurrent read-only use; an
/// implementation that is not should serialize access internally.
pub trait Classifier: Send + Sync {
    /// Class labels, in the column order of [`Classifier::predict_proba`].
    fn classes(&self) -> &[String];

    /// Predicted label for each text.
    fn predict(&self, batch: &[&str]) -> Result<Vec<String>, ClassifierError>;

    /// Probability vector (one entry per class) for each text.
    fn predict_proba(&self, batch: &[&str]) -> Result<Vec<Vec<f64>>, ClassifierError>;
}

/// A loaded classifier bound to the cleaning rule set it was trained with.
///
/// Cheap to clone; clones share the same classifier.
#[derive(Clone)]
pub struct ModelHandle {
    classifier: Arc<dyn Classifier>,
    ruleset: RulesetVersion,
}

impl ModelHandle {
    /// Wraps a classifier trained against `ruleset`.
    pub fn new<C>(classifier: C, ruleset: RulesetVersion) -> Self
    where
        C: Classifier + 'static,
    {
        Self::from_arc(Arc::new(classifier), ruleset)
    }

    /// Wraps an already shared classifier.
    pub fn from_arc(classifier: Arc<dyn Classifier>, ruleset: RulesetVersion) -> Self {
        Self {
            classifier,
            ruleset,
        }
    }

    /// The wrapped classifier.
    #[inline]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Rule set the classifier was trained against.
    #[inline]
    pub fn ruleset(&self) -> RulesetVersion {
        self.ruleset
    }

    /// Class labels of the wrapped classifier.
    #[inline]
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("ruleset", &self.ruleset)
            .field("classes", &self.classes())
            .finish()
    }
}
