//! Case folding and diacritic stripping.
//!
//! First two steps of the cleaning pipeline. ASCII input takes a byte-level
//! fast path; anything else goes through Unicode lowercasing and, when
//! enabled, NFD decomposition with combining marks dropped.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Configuration options for text normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Unicode-aware lowercasing.
    pub lowercase: bool,
    /// When enabled, decomposes characters and drops combining marks.
    /// For example, "café" becomes "cafe".
    pub strip_diacritics: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_diacritics: false,
        }
    }
}

/// Unicode case folder and diacritic stripper.
///
/// Unlike the later cleaning steps this never removes or merges words, so
/// it is also used to fold the stopword lists themselves.
///
/// # Examples
///
/// ```
/// use sentir_core::analyzer::normalizer::{NormalizerConfig, TextNormalizer};
///
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("HOLA Mundo"), "hola mundo");
///
/// let stripper = TextNormalizer::new(NormalizerConfig {
///     lowercase: true,
///     strip_diacritics: true,
/// });
/// assert_eq!(stripper.normalize("Café"), "cafe");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer {
    config: NormalizerConfig,
}

impl TextNormalizer {
    /// Creates a new normalizer with the specified configuration.
    pub const fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Clears the buffer before writing and reuses its capacity.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.reserve(input.len());

        // Combining marks are never ASCII, so ASCII input only needs case folding.
        if input.is_ascii() {
            if self.config.lowercase {
                out.extend(input.bytes().map(|b| b.to_ascii_lowercase() as char));
            } else {
                out.push_str(input);
            }
            return;
        }

        match (self.config.lowercase, self.config.strip_diacritics) {
            (true, true) => out.extend(
                input
                    .chars()
                    .flat_map(char::to_lowercase)
                    .nfd()
                    .filter(|c| !is_combining_mark(*c)),
            ),
            (true, false) => out.extend(input.chars().flat_map(char::to_lowercase)),
            (false, true) => out.extend(input.nfd().filter(|c| !is_combining_mark(*c))),
            (false, false) => out.push_str(input),
        }
    }

    /// Normalizes text and returns a new String.
    #[inline]
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }
}
