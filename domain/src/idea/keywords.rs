//! Keyword extraction for idea descriptions.
//!
//! Keywords are the most frequent non-stop-word tokens of a description.
//! They are fed into agent prompts as a compact topic summary.

use crate::core::string::words;
use std::collections::HashMap;

/// Default number of keywords kept per idea
pub const DEFAULT_KEYWORD_LIMIT: usize = 5;

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "also", "and", "any", "are", "because", "been", "before",
    "being", "between", "both", "but", "can", "could", "does", "doing", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "her", "here", "him", "his", "how",
    "idea", "into", "its", "just", "like", "make", "more", "most", "need", "not", "now", "off",
    "once", "only", "other", "our", "out", "over", "own", "same", "she", "should", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "too", "under", "until", "use", "using", "very", "want", "was", "way",
    "were", "what", "when", "where", "which", "while", "who", "why", "will", "with", "would",
    "you", "your",
];

/// Extract up to `limit` keywords from `text`.
///
/// Ranked by frequency, ties broken by first occurrence, so the result is
/// deterministic for a given input.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for (position, word) in words(text).enumerate() {
        if word.len() < 3 || word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if STOP_WORDS.contains(&word.as_str()) {
            continue;
        }
        let entry = counts.entry(word).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked.into_iter().take(limit).map(|(word, _, _)| word).collect()
}
