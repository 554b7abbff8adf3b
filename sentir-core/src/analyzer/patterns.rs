//! Regex-based noise removal.
//!
//! Three passes, each a pre-compiled regex behind a cheap prefilter:
//!
//! - **Handles**: URLs (`http://…`, `https://…`, `www.…`), `#hashtags`, `@mentions`
//! - **Punctuation**: anything that is not a word character or whitespace
//! - **Digits**: runs of (Unicode) decimal digits
//!
//! Matches are deleted, not replaced with spaces, so `"genial!!"` becomes
//! `"genial"` and `"a,b"` becomes `"ab"`.

use std::borrow::Cow;

use memchr::{memchr2, memmem};
use once_cell::sync::Lazy;
use regex::Regex;

static HANDLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://|www\.)\S+|[@#]\w+").expect("handle pattern is valid")
});

static PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]+").expect("punctuation pattern is valid"));

static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Returns `true` if `text` may contain a URL, hashtag or mention.
///
/// False positives are fine, false negatives are not.
#[inline]
fn may_contain_handle(text: &str) -> bool {
    let bytes = text.as_bytes();
    memchr2(b'@', b'#', bytes).is_some()
        || memmem::find(bytes, b"://").is_some()
        || memmem::find(bytes, b"www.").is_some()
}

/// Removes URLs, hashtags and mentions.
pub fn strip_handles(text: &str) -> Cow<'_, str> {
    if !may_contain_handle(text) {
        return Cow::Borrowed(text);
    }
    HANDLE_RE.replace_all(text, "")
}

/// Removes every character that is neither a word character nor whitespace.
///
/// Word characters follow Unicode rules: letters, marks, digits and
/// connector punctuation such as `_`.
pub fn strip_punctuation(text: &str) -> Cow<'_, str> {
    let ascii_clean = text
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b.is_ascii_whitespace());
    if ascii_clean {
        return Cow::Borrowed(text);
    }
    PUNCT_RE.replace_all(text, "")
}

/// Removes runs of decimal digits.
pub fn strip_digits(text: &str) -> Cow<'_, str> {
    // Non-ASCII digits exist, so only a pure-ASCII digit-free string can skip the regex.
    if text.is_ascii() && !text.bytes().any(|b| b.is_ascii_digit()) {
        return Cow::Borrowed(text);
    }
    DIGIT_RE.replace_all(text, "")
}
