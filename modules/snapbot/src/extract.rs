//! URL extraction from comment bodies.
//!
//! Broad heuristic (John Gruber's URL pattern): scheme-prefixed, `www.`
//! prefixed, or bare-domain-with-TLD tokens, tolerant of balanced
//! parentheses and trailing punctuation. Duplicates are not collapsed and
//! extraction order is preserved: downstream stages correlate capture
//! results with these URLs by position.

use regex::Regex;

const URL_PATTERN: &str = r#"(?i)\b((?:https?://|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#;

/// Scan a comment body for URL-shaped substrings.
pub fn extract_urls(body: &str) -> Vec<String> {
    let url_re = Regex::new(URL_PATTERN).expect("valid URL regex");
    url_re
        .find_iter(body)
        .map(|m| m.as_str().to_string())
        .collect()
}
