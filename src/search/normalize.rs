//! Text normalization shared by every matcher

/// Collapse whitespace runs (newlines and tabs included) to single spaces,
/// trim, and lowercase.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split normalized text into its non-empty words.
pub(crate) fn words(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|w| !w.is_empty()).collect()
}
