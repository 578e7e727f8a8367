//! Text helpers for free-form chat input.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static BREAK_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Flatten rich-text input into a single line of plain text.
///
/// Line breaks become spaces, other tags are dropped, common HTML entities
/// are decoded, compatibility characters are folded (NFKC) and runs of
/// whitespace collapse to one space.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    let value = BREAK_TAG_REGEX.replace_all(value, " ");
    let value = TAG_REGEX.replace_all(&value, "");
    let mut decoded = value.into_owned();
    for (entity, replacement) in ENTITIES {
        decoded = decoded.replace(entity, replacement);
    }
    let folded: String = decoded.nfkc().collect();
    WHITESPACE_REGEX.replace_all(&folded, " ").trim().to_owned()
}

/// Truncate to at most `limit` characters, marking the cut with `...`.
#[must_use]
pub fn truncate_chars(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_owned();
    }
    let keep = limit.saturating_sub(3);
    let mut out: String = value.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Upper-case the first character, leave the rest untouched.
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
