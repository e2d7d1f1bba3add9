//! Search query cleanup.
//!
//! The upstream search treats some characters as grammar (grouping, anchors,
//! quantifiers). Queries containing them either fail or match nothing, so they
//! are stripped before the request goes out.

use regex::Regex;
use std::sync::LazyLock;

static SIGNIFICANT_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\\[\]{}()<>^$|?*+]").unwrap());

/// Upstream search does poorly on a bare "0".
const ZERO_QUERY: &str = "0";
const ZERO_QUERY_BROADENED: &str = "zero OR 0";

/// A query ready to send, plus whether anything was removed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedQuery {
    pub term: String,
    pub sanitized: bool,
}

impl SanitizedQuery {
    /// True when nothing searchable is left.
    pub fn is_empty(&self) -> bool {
        self.term.trim().is_empty()
    }
}

pub fn has_significant_chars(query: &str) -> bool {
    SIGNIFICANT_CHARS.is_match(query)
}

/// Remove every significant character. Idempotent.
pub fn strip_significant_chars(query: &str) -> String {
    SIGNIFICANT_CHARS.replace_all(query, "").into_owned()
}

/// Strip significant characters and apply the numeric-title workaround.
pub fn sanitize_query(query: &str) -> SanitizedQuery {
    let sanitized = has_significant_chars(query);
    let stripped = if sanitized {
        strip_significant_chars(query)
    } else {
        query.to_string()
    };

    let term = if stripped == ZERO_QUERY {
        ZERO_QUERY_BROADENED.to_string()
    } else {
        stripped
    };

    SanitizedQuery { term, sanitized }
}
