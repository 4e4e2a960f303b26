//! Text normalization ahead of pattern matching.

use super::patterns::HORIZONTAL_WHITESPACE;

/// GREEK SMALL LETTER MU, often emitted by PDF text layers for the micro prefix.
const GREEK_MU: char = '\u{03bc}';

/// MICRO SIGN, the single code point patterns are written against.
const MICRO_SIGN: char = '\u{00b5}';

/// Normalize raw document text.
///
/// Runs of horizontal whitespace collapse to one space while line breaks are
/// kept, so line-anchored patterns still work. The micro prefix is unified to
/// U+00B5.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let unified = raw.replace(GREEK_MU, &MICRO_SIGN.to_string());
    HORIZONTAL_WHITESPACE.replace_all(&unified, " ").into_owned()
}

/// Normalize a categorical sex token by its first letter.
///
/// `F...` becomes `F`, `M...` becomes `M`; anything else is returned unchanged
/// for manual review.
pub fn normalize_sex(token: &str) -> String {
    let trimmed = token.trim();
    match trimmed.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('F') => "F".to_string(),
        Some('M') => "M".to_string(),
        _ => trimmed.to_string(),
    }
}
