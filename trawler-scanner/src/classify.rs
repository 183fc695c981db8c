//! Text classification: secret rules plus the structural extractors for
//! emails, endpoints and document links.
//!
//! Everything here is a pure function of its input and safe to call from any
//! number of workers at once.

use crate::patterns::secret_patterns;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email pattern")
});

static FULL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[\w\-.]+(?::\d+)?(?:/[\w\-./%~]*)?").expect("url pattern")
});

// A path only counts when it is not glued to a word, a host or another path
// segment, so `https://host/a/b` and `and/or` do not produce candidates.
static ENDPOINT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w\-./:<])((?:/[\w\-]+)+/?)").expect("endpoint path pattern")
});

const DOCUMENT_URL: &str =
    r"https?://[\w\-.]+(?::\d+)?/[\w\-./%~]*\.(?i:pdf|docx?|xlsx?|pptx?|txt|csv)";

static DOCUMENT_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"{}\b", DOCUMENT_URL)).expect("document pattern"));

static DOCUMENT_EXACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{}$", DOCUMENT_URL)).expect("document pattern"));

/// URLs and path fragments found in a block of text
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Absolute http(s) URLs
    pub urls: BTreeSet<String>,
    /// Path-only candidates such as `/api/v2/login`
    pub paths: BTreeSet<String>,
}

/// Run every secret rule over `text`.
///
/// Each category maps to the set of distinct matched substrings; categories
/// without a match are left out. Empty text yields an empty map.
pub fn classify(text: &str) -> BTreeMap<String, BTreeSet<String>> {
    let mut found = BTreeMap::new();
    if text.is_empty() {
        return found;
    }

    for pattern in secret_patterns() {
        let matches: BTreeSet<String> = pattern
            .regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        if !matches.is_empty() {
            found.insert(pattern.name.to_string(), matches);
        }
    }

    found
}

pub fn extract_emails(text: &str) -> BTreeSet<String> {
    EMAIL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn extract_endpoints(text: &str) -> Endpoints {
    let urls = FULL_URL
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .collect();

    let paths = ENDPOINT_PATH
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    Endpoints { urls, paths }
}

/// Absolute URLs in `text` whose path ends in a document extension
pub fn extract_document_links(text: &str) -> BTreeSet<String> {
    DOCUMENT_IN_TEXT
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whether a single normalized URL points at a document
pub fn is_document_link(url: &str) -> bool {
    DOCUMENT_EXACT.is_match(url)
}
