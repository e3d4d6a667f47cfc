//! Best-effort ticker extraction from free text.
//!
//! This is a regex scan, not a lookup against a ticker registry. It returns the first
//! word-bounded run of 1-5 uppercase ASCII letters that is at least two characters long and not
//! in [`STOPLIST`]. Capitalised words that appear before the real ticker ("CEO", "AI", "USA")
//! win over it, and real one-letter tickers are never returned.

use regex::Regex;
use std::sync::LazyLock;

/// Uppercase words that are never treated as tickers.
pub const STOPLIST: [&str; 11] = [
    "THE", "AND", "FOR", "ARE", "YOU", "ALL", "NEW", "TOP", "BEST", "HIGH", "LOW",
];

const MIN_SYMBOL_LEN: usize = 2;

// Unicode word boundaries: "ÉTAGE" does not yield "TAGE".
static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{1,5}\b").expect("symbol pattern is valid"));

pub fn extract_symbol(text: &str) -> Option<String> {
    SYMBOL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| candidate.len() >= MIN_SYMBOL_LEN && !STOPLIST.contains(candidate))
        .map(str::to_string)
}
