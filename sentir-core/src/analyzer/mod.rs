//! Text cleaning pipeline.
//!
//! This module provides the text processing components:
//! - **Normalizer**: Case folding and diacritic stripping
//! - **Patterns**: URL, handle, punctuation and digit removal
//! - **Stopwords**: Effective stopword set with preserved negations
//! - **Cleaner**: Runs a versioned rule set end to end

pub mod cleaner;
pub mod normalizer;
pub mod patterns;
pub mod stopwords;

pub use cleaner::{CleaningRuleSet, TextCleaner};
pub use normalizer::{NormalizerConfig, TextNormalizer};
pub use stopwords::StopwordSet;
