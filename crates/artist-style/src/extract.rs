//! Candidate name extraction from free-form prompts.

use std::sync::LazyLock;

use regex::Regex;

/// Words that separate or decorate names but are never names themselves.
pub const STOP_WORDS: &[&str] = &["the", "a", "an", "with", "featuring", "ft", "feat"];

static SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,\n]|\s+and\s+").expect("separator pattern is valid")
});

/// Splits `prompt` on commas, newlines and the word "and", trims each part,
/// and drops empty parts and stop words. Order follows the prompt.
pub fn extract_candidates(prompt: &str) -> Vec<String> {
    SEPARATOR_PATTERN
        .split(prompt)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter(|part| !is_stop_word(part))
        .map(str::to_string)
        .collect()
}

pub fn is_stop_word(part: &str) -> bool {
    let lower = part.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}
