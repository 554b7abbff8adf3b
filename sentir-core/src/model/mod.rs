//! Model lifecycle.
//!
//! The inference adapter only needs a [`Classifier`]; this module provides
//! the trait, a concrete linear implementation, its JSON artifact format and
//! the startup loader that binds a model to its cleaning rule set.

mod artifact;
mod classifier;
mod error;
mod linear;
mod loader;

pub use artifact::{FeatureNorm, ModelArtifact, ARTIFACT_FORMAT_VERSION, MAX_NGRAM};
pub use classifier::{Classifier, ModelHandle};
pub use error::ModelError;
pub use linear::LinearTextClassifier;
pub use loader::load_model;
