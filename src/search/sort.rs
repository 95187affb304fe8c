//! Library ordering of titles

use crate::search::Searchable;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static LEADING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(the|a|an)\s+").expect("leading article pattern is valid"));

/// Lowercased title with one leading "the", "a" or "an" removed.
pub fn sort_key(title: &str) -> String {
    let lowered = title.to_lowercase();
    LEADING_ARTICLE.replace(&lowered, "").into_owned()
}

/// Compare two titles by their library sort keys.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Stable in-place sort of records by title sort key.
pub fn sort_by_title<R: Searchable>(records: &mut [R]) {
    records.sort_by_cached_key(|record| sort_key(record.title()));
}
