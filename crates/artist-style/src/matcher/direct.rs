//! Exact, whole-word substitution of dictionary names.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::dictionary::StyleDictionary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectReplacement {
    pub text: String,
    /// Names in the order they were processed (longest first).
    pub replaced_names: Vec<String>,
    /// Byte ranges of inserted style text in `text`, in order.
    pub styled: Vec<Range<usize>>,
}

impl DirectReplacement {
    pub(crate) fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            replaced_names: Vec::new(),
            styled: Vec::new(),
        }
    }
}

/// Case-insensitive, whole-word pattern for a literal name.
pub fn whole_word_pattern(name: &str) -> Option<Regex> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(name)))
        .case_insensitive(true)
        .build()
        .map_err(|error| tracing::warn!("skipping name {name:?}: {error}"))
        .ok()
}

struct Claim<'a> {
    start: usize,
    end: usize,
    style: &'a str,
}

/// Replaces every whole-word occurrence of each dictionary name with its
/// style, longest names first.
///
/// Matches are taken against the original text. A span already claimed by a
/// longer name is never matched again, so a shorter name cannot fire inside
/// a longer one or inside style text inserted for it.
pub fn replace_known(text: &str, dictionary: &StyleDictionary) -> DirectReplacement {
    if !dictionary.enabled || dictionary.is_empty() {
        return DirectReplacement::unchanged(text);
    }

    let mut claims: Vec<Claim<'_>> = Vec::new();
    let mut replaced_names = Vec::new();

    for (name, style) in dictionary.entries_longest_first() {
        let Some(pattern) = whole_word_pattern(name) else {
            continue;
        };
        let mut matched = false;
        for found in pattern.find_iter(text) {
            if found.start() == found.end() {
                continue;
            }
            let overlaps = claims
                .iter()
                .any(|claim| claim.start < found.end() && found.start() < claim.end);
            if overlaps {
                continue;
            }
            claims.push(Claim {
                start: found.start(),
                end: found.end(),
                style,
            });
            matched = true;
        }
        if matched {
            replaced_names.push(name.to_string());
        }
    }

    if claims.is_empty() {
        return DirectReplacement::unchanged(text);
    }

    claims.sort_by_key(|claim| claim.start);
    let mut output = String::with_capacity(text.len());
    let mut styled = Vec::with_capacity(claims.len());
    let mut cursor = 0;
    for claim in &claims {
        output.push_str(&text[cursor..claim.start]);
        let start = output.len();
        output.push_str(claim.style);
        styled.push(start..output.len());
        cursor = claim.end;
    }
    output.push_str(&text[cursor..]);

    DirectReplacement {
        text: output,
        replaced_names,
        styled,
    }
}
