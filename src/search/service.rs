//! Search engine: query evaluation over in-memory records

use crate::search::config::SearchConfig;
use crate::search::matcher::{exact_match, FuzzyMatcher};
use crate::search::query::{parse_search_query, ParsedQuery, QueryKind};
use crate::search::sort::sort_key;
use crate::search::Searchable;
use tracing::debug;

/// Stateless search engine.
///
/// Every call scans the candidates linearly; there is no index to keep in
/// sync with the store.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    fuzzy: FuzzyMatcher,
}

impl SearchEngine {
    /// Create a new search engine
    pub fn new(config: SearchConfig) -> Self {
        Self {
            fuzzy: FuzzyMatcher::new(config),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        self.fuzzy.config()
    }

    /// Parse a raw query string
    pub fn parse(&self, raw: &str) -> ParsedQuery {
        parse_search_query(raw)
    }

    /// Match a single text field against a parsed query
    pub fn matches_text(&self, query: &ParsedQuery, text: &str) -> bool {
        match query.kind {
            QueryKind::Exact => exact_match(text, &query.term),
            QueryKind::Fuzzy => self.fuzzy.matches(text, &query.term),
        }
    }

    /// A record matches when its title or its lyrics match
    pub fn matches<R: Searchable + ?Sized>(&self, query: &ParsedQuery, record: &R) -> bool {
        self.matches_text(query, record.title()) || self.matches_text(query, record.lyrics())
    }

    /// Filter records and return them in library order.
    ///
    /// The containment predicate runs before text matching. A missing or
    /// blank query keeps every record that passes the predicate.
    pub fn filter_and_sort<'a, R: Searchable>(
        &self,
        records: &'a [R],
        raw_query: Option<&str>,
        predicate: Option<&dyn Fn(&R) -> bool>,
    ) -> Vec<&'a R> {
        let candidates = records
            .iter()
            .filter(|record| predicate.map_or(true, |keep| keep(record)));

        let mut results: Vec<&R> = match raw_query.filter(|q| !q.trim().is_empty()) {
            Some(raw) => {
                let query = self.parse(raw);
                let matched: Vec<&R> = candidates
                    .filter(|record| self.matches(&query, *record))
                    .collect();

                debug!(
                    kind = ?query.kind,
                    term = %query.term,
                    total = records.len(),
                    matched = matched.len(),
                    "Search filter applied"
                );
                matched
            }
            None => candidates.collect(),
        };

        results.sort_by_cached_key(|record| sort_key(record.title()));
        results
    }
}

/// Filter and sort with the default search configuration.
pub fn filter_and_sort<'a, R: Searchable>(
    records: &'a [R],
    raw_query: Option<&str>,
    predicate: Option<&dyn Fn(&R) -> bool>,
) -> Vec<&'a R> {
    SearchEngine::default().filter_and_sort(records, raw_query, predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        title: &'static str,
        lyrics: &'static str,
    }

    impl Searchable for Record {
        fn title(&self) -> &str {
            self.title
        }

        fn lyrics(&self) -> &str {
            self.lyrics
        }
    }

    fn records() -> Vec<Record> {
        vec![
            Record {
                title: "Apple Tree Wassail",
                lyrics: "Old apple tree we wassail thee",
            },
            Record {
                title: "The Bells of Norwich",
                lyrics: "All shall be well",
            },
            Record {
                title: "Chariots",
                lyrics: "Swing low\nsweet chariots",
            },
        ]
    }

    fn titles(results: &[&Record]) -> Vec<&'static str> {
        results.iter().map(|r| r.title).collect()
    }

    #[test]
    fn test_no_query_returns_everything_sorted() {
        let records = records();
        let results = filter_and_sort(&records, None, None);
        assert_eq!(
            titles(&results),
            vec!["Apple Tree Wassail", "The Bells of Norwich", "Chariots"]
        );
    }

    #[test]
    fn test_blank_query_is_browse_all() {
        let records = records();
        assert_eq!(filter_and_sort(&records, Some("   "), None).len(), 3);
    }

    #[test]
    fn test_fuzzy_matches_title_or_lyrics() {
        let records = records();
        assert_eq!(titles(&filter_and_sort(&records, Some("chariot"), None)), vec!["Chariots"]);
        assert_eq!(
            titles(&filter_and_sort(&records, Some("wasail"), None)),
            vec!["Apple Tree Wassail"]
        );
    }

    #[test]
    fn test_exact_query_spans_line_breaks() {
        let records = records();
        assert_eq!(
            titles(&filter_and_sort(&records, Some("\"Swing low sweet\""), None)),
            vec!["Chariots"]
        );
        assert!(filter_and_sort(&records, Some("\"swing lo sweet\""), None).is_empty());
    }

    #[test]
    fn test_exact_phrase_matches_single_song() {
        let records = records();
        assert_eq!(
            titles(&filter_and_sort(&records, Some("\"All shall be well\""), None)),
            vec!["The Bells of Norwich"]
        );
    }

    #[test]
    fn test_predicate_applies_before_query() {
        let records = records();
        let only_bells = |r: &Record| r.title.contains("Bells");
        let results = filter_and_sort(&records, Some("well"), Some(&only_bells));
        assert_eq!(titles(&results), vec!["The Bells of Norwich"]);

        let results = filter_and_sort(&records, Some("chariot"), Some(&only_bells));
        assert!(results.is_empty());
    }
}
