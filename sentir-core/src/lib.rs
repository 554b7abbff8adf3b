//! Sentiment text cleaning and inference.
//!
//! - [`analyzer`]: versioned cleaning pipeline (case folding, diacritics,
//!   handles, punctuation, digits, stopwords with negations kept)
//! - [`model`]: classifier trait, linear model artifacts and their loader
//! - [`inference`]: the predictor tying both together
//!
//! ```no_run
//! use sentir_core::inference::SentimentPredictor;
//! use sentir_core::model::load_model;
//! use sentir_types::PredictorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PredictorConfig::default();
//! let model = load_model("model.json", config.ruleset)?;
//! let predictor = SentimentPredictor::new(config, model)?;
//!
//! let outcome = predictor.predict("Me encanta este producto, es excelente!")?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod inference;
pub mod model;

pub use analyzer::TextCleaner;
pub use inference::{Readiness, SentimentPredictor};
pub use model::{load_model, Classifier, ModelError, ModelHandle};
pub use sentir_types::{PredictError, PredictorConfig, RulesetVersion, SentimentOutcome};
