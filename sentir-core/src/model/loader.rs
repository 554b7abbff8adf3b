//! Loads a model artifact from disk at process start.

use std::fs;
use std::io;
use std::path::Path;

use sentir_types::RulesetVersion;
use tracing::info;

use super::artifact::ModelArtifact;
use super::classifier::{Classifier, ModelHandle};
use super::error::ModelError;
use super::linear::LinearTextClassifier;

/// Reads, validates and wraps the model at `path`.
///
/// `active` is the rule set the service cleans text with; an artifact
/// trained against any other version is refused.
///
/// # Errors
///
/// - `ModelError::NotFound` if the file does not exist
/// - `ModelError::Io` if it cannot be read
/// - `ModelError::Deserialize` if it is not a valid artifact document
/// - `ModelError::RulesetMismatch` if it was trained with other cleaning rules
/// - `ModelError::Invalid` if its shapes or weights are inconsistent
pub fn load_model(path: impl AsRef<Path>, active: RulesetVersion) -> Result<ModelHandle, ModelError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ModelError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ModelError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let artifact = ModelArtifact::from_slice(&bytes).map_err(|source| ModelError::Deserialize {
        path: path.to_path_buf(),
        source,
    })?;

    if artifact.ruleset != active {
        return Err(ModelError::RulesetMismatch {
            trained: artifact.ruleset,
            active,
        });
    }

    let classifier = LinearTextClassifier::from_artifact(artifact)?;
    info!(
        path = %path.display(),
        ruleset = %active,
        rules = %rule_names(active),
        classes = ?classifier.classes(),
        features = classifier.n_features(),
        "sentiment model loaded"
    );

    Ok(ModelHandle::new(classifier, active))
}

/// Comma-separated names of the cleaning steps of `ruleset`, in order.
fn rule_names(ruleset: RulesetVersion) -> String {
    ruleset
        .rules()
        .iter()
        .map(|rule| rule.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
