//! Name canonicalization shared by every matching path.

use unicode_normalization::UnicodeNormalization;

/// Canonical comparison form of an artist name.
///
/// Lower-cases, strips combining diacritics after NFD decomposition, drops
/// apostrophe variants and any other character that is neither a word
/// character nor whitespace, then trims. `"Beyoncé"` and `"Beyonce"` map to
/// the same value, as do `"Guns N' Roses"` and `"Guns N Roses"`.
pub fn normalize_name(value: &str) -> String {
    let folded = value.to_lowercase();
    let stripped: String = folded
        .nfd()
        .filter(|ch| !is_combining_diacritic(*ch))
        .filter(|ch| !is_apostrophe(*ch))
        .filter(|ch| is_word_char(*ch) || ch.is_whitespace())
        .collect();
    stripped.trim().to_string()
}

pub(crate) fn is_combining_diacritic(ch: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&ch)
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2018}' | '\u{2019}' | '`')
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
