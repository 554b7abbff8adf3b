//! Versioned cleaning pipeline.
//!
//! Turns raw user text into the canonical string a classifier is trained
//! on. The pipeline is a fixed sequence of [`CleaningRule`]s chosen by a
//! [`RulesetVersion`]:
//!
//! ```text
//! raw ─▶ lowercase ─▶ strip diacritics ─▶ strip handles ─▶ strip punctuation
//!     ─▶ strip digits ─▶ drop stopwords ─▶ join with single spaces
//! ```
//!
//! Steps a version does not include are skipped. Cleaning never fails; text
//! that loses every token comes out as the empty string.
//!
//! ## Idempotence
//!
//! Every step only removes characters or folds them to a fixed point, so
//! `clean(clean(x)) == clean(x)` holds for every input and every version.

use std::borrow::Cow;

use sentir_types::{CleaningRule, RulesetVersion};
use smallvec::SmallVec;

use super::normalizer::{NormalizerConfig, TextNormalizer};
use super::patterns;
use super::stopwords::StopwordSet;

/// A rule-set version together with the stopword lists it filters.
#[derive(Debug, Clone)]
pub struct CleaningRuleSet {
    version: RulesetVersion,
    stopwords: StopwordSet,
}

impl CleaningRuleSet {
    /// The built-in Spanish lists under `version`.
    pub fn standard(version: RulesetVersion) -> Self {
        let normalizer = TextNormalizer::new(normalizer_config(version));
        Self {
            version,
            stopwords: StopwordSet::spanish(&normalizer),
        }
    }

    /// Custom stopword and negation lists under `version`.
    ///
    /// Lists are folded with the version's case and diacritic rules.
    pub fn with_lists<'a, B, N>(version: RulesetVersion, base: B, negations: N) -> Self
    where
        B: IntoIterator<Item = &'a str>,
        N: IntoIterator<Item = &'a str>,
    {
        let normalizer = TextNormalizer::new(normalizer_config(version));
        Self {
            version,
            stopwords: StopwordSet::new(base, negations, &normalizer),
        }
    }

    /// Rule-set version.
    #[inline]
    pub fn version(&self) -> RulesetVersion {
        self.version
    }

    /// Ordered rules applied by this set.
    #[inline]
    pub fn rules(&self) -> &'static [CleaningRule] {
        self.version.rules()
    }

    /// Effective stopwords and preserved negations.
    #[inline]
    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }
}

fn normalizer_config(version: RulesetVersion) -> NormalizerConfig {
    NormalizerConfig {
        lowercase: version.applies(CleaningRule::Lowercase),
        strip_diacritics: version.applies(CleaningRule::StripDiacritics),
    }
}

/// Applies `step` to `text`, keeping the existing buffer when nothing changed.
fn apply<'a, F>(text: Cow<'a, str>, step: F) -> Cow<'a, str>
where
    F: for<'b> FnOnce(&'b str) -> Cow<'b, str>,
{
    let replaced = match step(&text) {
        Cow::Borrowed(_) => None,
        Cow::Owned(changed) => Some(changed),
    };
    match replaced {
        Some(changed) => Cow::Owned(changed),
        None => text,
    }
}

/// Deterministic text cleaner bound to one rule set.
///
/// # Examples
///
/// ```
/// use sentir_core::analyzer::TextCleaner;
///
/// let cleaner = TextCleaner::default();
/// assert_eq!(
///     cleaner.clean("Me encanta este producto, es excelente!"),
///     "encanta producto excelente"
/// );
/// assert_eq!(cleaner.clean("de la y el"), "");
/// ```
#[derive(Debug, Clone)]
pub struct TextCleaner {
    rules: CleaningRuleSet,
    normalizer: TextNormalizer,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::standard(RulesetVersion::CURRENT)
    }
}

impl TextCleaner {
    /// Creates a cleaner for the given rule set.
    pub fn new(rules: CleaningRuleSet) -> Self {
        let normalizer = TextNormalizer::new(normalizer_config(rules.version()));
        Self { rules, normalizer }
    }

    /// Cleaner with the built-in Spanish lists under `version`.
    pub fn standard(version: RulesetVersion) -> Self {
        Self::new(CleaningRuleSet::standard(version))
    }

    /// Rule-set version this cleaner applies.
    #[inline]
    pub fn version(&self) -> RulesetVersion {
        self.rules.version()
    }

    /// The rule set this cleaner applies.
    #[inline]
    pub fn rule_set(&self) -> &CleaningRuleSet {
        &self.rules
    }

    /// Cleans `raw` into an existing buffer, clearing it first.
    pub fn clean_into(&self, raw: &str, out: &mut String) {
        out.clear();

        let mut text = Cow::Borrowed(raw);
        let mut normalized = false;

        for rule in self.rules.rules() {
            text = match rule {
                // Both steps are done by one normalizer pass.
                CleaningRule::Lowercase | CleaningRule::StripDiacritics => {
                    if normalized {
                        continue;
                    }
                    normalized = true;
                    Cow::Owned(self.normalizer.normalize(&text))
                }
                CleaningRule::StripHandles => apply(text, patterns::strip_handles),
                CleaningRule::StripPunctuation => apply(text, patterns::strip_punctuation),
                CleaningRule::StripDigits => apply(text, patterns::strip_digits),
                CleaningRule::RemoveStopwords => Cow::Owned(self.drop_stopwords(&text)),
            };
        }

        join_tokens(&text, out);
    }

    /// Cleans `raw` and returns a new String.
    #[inline]
    pub fn clean(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        self.clean_into(raw, &mut out);
        out
    }

    /// Cleans raw bytes. Input that is not valid UTF-8 cleans to `""`.
    pub fn clean_bytes(&self, raw: &[u8]) -> String {
        std::str::from_utf8(raw)
            .map(|text| self.clean(text))
            .unwrap_or_default()
    }

    fn drop_stopwords(&self, text: &str) -> String {
        let stopwords = self.rules.stopwords();
        let kept: SmallVec<[&str; 32]> = text
            .split_whitespace()
            .filter(|token| !stopwords.is_stopword(token))
            .collect();
        kept.join(" ")
    }
}

/// Writes the whitespace-separated tokens of `text` to `out`, one space apart.
fn join_tokens(text: &str, out: &mut String) {
    for (i, token) in text.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token);
    }
}
