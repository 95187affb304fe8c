//! Exact and fuzzy text matchers

use crate::search::config::SearchConfig;
use crate::search::normalize::{normalize, words};

/// Levenshtein distance over Unicode scalar values.
///
/// Unit cost for insertion, deletion and substitution; transpositions count
/// as two edits.
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// True iff the normalized term is a substring of the normalized text.
pub fn exact_match(text: &str, term: &str) -> bool {
    normalize(text).contains(&normalize(term))
}

/// Fuzzy match with the default configuration.
pub fn fuzzy_match(text: &str, term: &str) -> bool {
    FuzzyMatcher::default().matches(text, term)
}

/// Word-by-word typo-tolerant matcher
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: SearchConfig,
}

impl FuzzyMatcher {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Every word of `term` has to match some word of `text`.
    pub fn matches(&self, text: &str, term: &str) -> bool {
        self.matches_normalized(&normalize(text), &normalize(term))
    }

    fn matches_normalized(&self, text: &str, term: &str) -> bool {
        if text.contains(term) {
            return true;
        }

        if term.chars().count() <= self.config.short_query_max_len {
            return false;
        }

        let text_words = words(text);
        words(term)
            .into_iter()
            .all(|query_word| text_words.iter().any(|t| self.word_matches(query_word, t)))
    }

    /// Whether a single query word matches a single text word.
    pub fn word_matches(&self, query_word: &str, text_word: &str) -> bool {
        if text_word.contains(query_word) {
            return true;
        }
        if self.config.bidirectional_containment && query_word.contains(text_word) {
            return true;
        }

        let query_len = query_word.chars().count();
        let text_len = text_word.chars().count();

        if self.config.length_gate
            && query_len.abs_diff(text_len) > self.config.max_length_difference
        {
            return false;
        }

        levenshtein(query_word, text_word) <= self.max_edits(query_len)
    }

    /// Edit budget for a query word of `query_len` characters.
    pub fn max_edits(&self, query_len: usize) -> usize {
        ((query_len as f64 * self.config.error_rate).floor() as usize).max(1)
    }
}
