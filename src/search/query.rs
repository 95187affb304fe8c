//! Search query parsing

use serde::{Deserialize, Serialize};

/// How a query term is matched against text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Literal substring after normalization
    Exact,
    /// Typo-tolerant multi-word match
    Fuzzy,
}

/// A raw query string resolved into a match strategy and term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub kind: QueryKind,
    pub term: String,
}

impl ParsedQuery {
    pub fn exact(term: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Exact,
            term: term.into(),
        }
    }

    pub fn fuzzy(term: impl Into<String>) -> Self {
        Self {
            kind: QueryKind::Fuzzy,
            term: term.into(),
        }
    }

    pub fn is_exact(&self) -> bool {
        self.kind == QueryKind::Exact
    }
}

/// Parse a raw query.
///
/// A query wrapped in one pair of double quotes with non-blank content is an
/// exact query for the inner text. Anything else, including `""`, unbalanced
/// quotes or quotes around only part of the input, is a fuzzy query for the
/// raw string as given. Embedded quotes are not escaped: `"a" "b"` is the
/// exact term `a" "b`.
pub fn parse_search_query(raw: &str) -> ParsedQuery {
    let trimmed = raw.trim();

    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        let inner = &trimmed[1..trimmed.len() - 1];
        if !inner.trim().is_empty() {
            return ParsedQuery::exact(inner);
        }
    }

    ParsedQuery::fuzzy(raw)
}
