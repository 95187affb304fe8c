//! Lyric search: query parsing, normalization and approximate matching
//!
//! Queries come in two flavours:
//!
//! - **Exact**: the whole query wrapped in double quotes. The inner text must
//!   appear verbatim in the title or lyrics, ignoring case and whitespace
//!   layout (lyrics are usually stored with line breaks).
//! - **Fuzzy**: anything else. Each query word must match some word of the
//!   title or lyrics, either by containment or within a small Levenshtein
//!   distance proportional to the word length.
//!
//! Matching is boolean; results are always returned in library order
//! (title ignoring a leading "the", "a" or "an").
//!
//! ```text
//!  raw query ──► parse_search_query ──► ParsedQuery { kind, term }
//!                                            │
//!   records ──► predicate ──► exact_match / FuzzyMatcher (title || lyrics)
//!                                            │
//!                                            ▼
//!                                  sort by sort_key(title)
//! ```
//!
//! # Example
//!
//! ```
//! use lyric_catalog::search::{filter_and_sort, Searchable};
//!
//! struct Hymn(&'static str, &'static str);
//!
//! impl Searchable for Hymn {
//!     fn title(&self) -> &str { self.0 }
//!     fn lyrics(&self) -> &str { self.1 }
//! }
//!
//! let hymns = [Hymn("Shepherds Arise", "Shepherds arise, be not afeared")];
//! let found = filter_and_sort(&hymns, Some("sheperds"), None);
//! assert_eq!(found.len(), 1);
//! ```

mod config;
mod matcher;
mod normalize;
mod query;
mod service;
mod sort;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use matcher::{exact_match, fuzzy_match, levenshtein, FuzzyMatcher};
pub use normalize::normalize;
pub use query::{parse_search_query, ParsedQuery, QueryKind};
pub use service::{filter_and_sort, SearchEngine};
pub use sort::{compare_titles, sort_by_title, sort_key};

/// A record that can be searched by title and lyrics.
///
/// Records without lyrics keep the default, which reads as empty text.
pub trait Searchable {
    fn title(&self) -> &str;

    fn lyrics(&self) -> &str {
        ""
    }
}

impl Searchable for str {
    fn title(&self) -> &str {
        self
    }
}

impl Searchable for String {
    fn title(&self) -> &str {
        self
    }
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn title(&self) -> &str {
        (**self).title()
    }

    fn lyrics(&self) -> &str {
        (**self).lyrics()
    }
}
