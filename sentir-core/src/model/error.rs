//! Startup failures.

use std::io;
use std::path::PathBuf;

use sentir_types::RulesetVersion;
use thiserror::Error;

/// Reasons a model cannot be brought into service.
///
/// All of these are fatal at startup: a process that hits one must not
/// accept inference traffic.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model file does not exist.
    #[error("model file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// The model file exists but could not be read.
    #[error("failed to read model file {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The model file is not a valid artifact document.
    #[error("failed to deserialize model file {}", path.display())]
    Deserialize {
        /// Path that was read.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The artifact parsed but its contents are inconsistent.
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    /// The artifact was trained with a different cleaning rule set.
    #[error("model was trained with cleaning rules {trained}, but the service applies {active}")]
    RulesetMismatch {
        /// Rule set recorded in the artifact.
        trained: RulesetVersion,
        /// Rule set the service cleans text with.
        active: RulesetVersion,
    },
}

impl ModelError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ModelError::Invalid(reason.into())
    }
}
