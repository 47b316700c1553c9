use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Characters stripped by the Keras tokenizer before splitting.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").expect("word pattern is valid"));

pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Lowercased whitespace-separated words, deduplicated.
pub fn word_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Lowercased alphanumeric words in order, punctuation dropped.
pub fn words(text: &str) -> Vec<String> {
    let lower = normalize(text);
    WORD_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().trim_matches('\'').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercases, replaces every filter character with a space and splits on
/// spaces, the way the sequence model's tokenizer was fitted.
pub fn filter_and_split(text: &str, filters: &str) -> Vec<String> {
    let cleaned: String = normalize(text)
        .chars()
        .map(|c| if filters.contains(c) { ' ' } else { c })
        .collect();
    cleaned
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
