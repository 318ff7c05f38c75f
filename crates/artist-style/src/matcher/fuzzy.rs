//! Single substitution of a name matched in normalized form.

use std::ops::Range;

use crate::normalize::{is_combining_diacritic, is_word_char, normalize_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyReplacement {
    pub text: String,
    pub replaced: bool,
    /// Where `replacement` now sits in `text`.
    pub span: Option<Range<usize>>,
}

impl FuzzyReplacement {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            replaced: false,
            span: None,
        }
    }
}

/// Replaces the first run of tokens in `text` whose normalized form equals
/// the normalized `target`, so spelling differences in accents, apostrophes
/// or punctuation still match. At most one substitution happens per call.
///
/// A match starts on a word token and spans at most `2k + 1` tokens, where
/// `k` is the number of whitespace-separated words in `target`.
pub fn replace_fuzzy(text: &str, target: &str, replacement: &str) -> FuzzyReplacement {
    replace_fuzzy_excluding(text, target, replacement, &[])
}

/// Same as [`replace_fuzzy`], but a token run touching any byte range in
/// `protected` is never matched.
pub fn replace_fuzzy_excluding(
    text: &str,
    target: &str,
    replacement: &str,
    protected: &[Range<usize>],
) -> FuzzyReplacement {
    let wanted = normalize_name(target);
    if wanted.is_empty() {
        return FuzzyReplacement::unchanged(text);
    }

    let word_count = target.split_whitespace().count().max(1);
    let max_tokens = 2 * word_count + 1;
    let tokens = tokenize(text);
    let is_protected = |range: &Range<usize>| {
        protected
            .iter()
            .any(|claimed| claimed.start < range.end && range.start < claimed.end)
    };

    for (start_index, start) in tokens.iter().enumerate() {
        if !start.is_word || is_protected(&start.range) {
            continue;
        }
        let last = (start_index + max_tokens).min(tokens.len());
        for token in &tokens[start_index..last] {
            if is_protected(&token.range) {
                break;
            }
            let span = start.range.start..token.range.end;
            let normalized = normalize_name(&text[span.clone()]);
            if normalized == wanted {
                let inserted = span.start..span.start + replacement.len();
                return FuzzyReplacement {
                    text: splice(text, span, replacement),
                    replaced: true,
                    span: Some(inserted),
                };
            }
            // Extending only appends, so a non-prefix can never become a match.
            if !wanted.starts_with(&normalized) {
                break;
            }
        }
    }

    FuzzyReplacement::unchanged(text)
}

/// Moves `ranges` to account for `removed` being replaced by `inserted_len`
/// bytes. Ranges before the edit stay put.
pub fn shift_ranges(ranges: &mut [Range<usize>], removed: Range<usize>, inserted_len: usize) {
    for range in ranges.iter_mut() {
        if range.start >= removed.end {
            let start = range.start - removed.end + removed.start + inserted_len;
            let end = range.end - removed.end + removed.start + inserted_len;
            *range = start..end;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    range: Range<usize>,
    is_word: bool,
}

/// Splits at every word boundary. Separators are kept as their own tokens so
/// the tokens concatenate back to the input.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    for (offset, ch) in text.char_indices() {
        let is_word = is_word_char(ch) || is_combining_diacritic(ch);
        let end = offset + ch.len_utf8();
        match tokens.last_mut() {
            Some(last) if last.is_word == is_word => last.range.end = end,
            _ => tokens.push(Token {
                range: offset..end,
                is_word,
            }),
        }
    }
    tokens
}

fn splice(text: &str, span: Range<usize>, replacement: &str) -> String {
    let mut output = String::with_capacity(text.len() + replacement.len());
    output.push_str(&text[..span.start]);
    output.push_str(replacement);
    output.push_str(&text[span.end..]);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_unaccented_spelling() {
        let result = replace_fuzzy("I love Beyonce and Adele", "Beyoncé", "STYLE");
        assert_eq!(result.text, "I love STYLE and Adele");
        assert!(result.replaced);
    }

    #[test]
    fn no_match_leaves_text_untouched() {
        let result = replace_fuzzy("I love Beyonce and Adele", "Madonna", "STYLE");
        assert_eq!(result.text, "I love Beyonce and Adele");
        assert!(!result.replaced);
    }

    #[test]
    fn matches_multi_word_names_across_apostrophes() {
        let result = replace_fuzzy("Guns N Roses, Queen", "Guns N' Roses", "Hard Rock");
        assert_eq!(result.text, "Hard Rock, Queen");

        let result = replace_fuzzy("Guns N\u{2019} Roses, Queen", "Guns N Roses", "Hard Rock");
        assert_eq!(result.text, "Hard Rock, Queen");
    }

    #[test]
    fn replaces_only_first_occurrence() {
        let result = replace_fuzzy("Adele, adele", "ADELE", "Soul");
        assert_eq!(result.text, "Soul, adele");
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        let result = replace_fuzzy("mix  Sigur Ros  please", "Sigur Rós", "Post-Rock");
        assert_eq!(result.text, "mix  Post-Rock  please");
    }

    #[test]
    fn does_not_match_inside_longer_words() {
        let result = replace_fuzzy("Adeles", "Adele", "Soul");
        assert!(!result.replaced);
    }

    #[test]
    fn decomposed_input_is_consumed_whole() {
        let result = replace_fuzzy("Beyonce\u{0301} live", "Beyoncé", "R&B");
        assert_eq!(result.text, "R&B live");
    }

    #[test]
    fn blank_target_never_matches() {
        let result = replace_fuzzy("anything", "  ", "X");
        assert!(!result.replaced);
        assert_eq!(result.text, "anything");
    }

    #[test]
    fn tokens_reassemble_input() {
        let text = "Guns N' Roses, AC/DC & Beyoncé!";
        let joined: String = tokenize(text)
            .iter()
            .map(|token| &text[token.range.clone()])
            .collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn reports_inserted_span() {
        let result = replace_fuzzy("I love Beyonce and Adele", "Beyoncé", "STYLE");
        assert_eq!(result.span, Some(7..12));
        assert_eq!(&result.text[7..12], "STYLE");
    }

    #[test]
    fn protected_ranges_are_skipped() {
        // "soft rock" was inserted earlier and must survive.
        let text = "soft rock, Rock";
        let result = replace_fuzzy_excluding(text, "Rock", "GENERATED", &[0..9]);
        assert_eq!(result.text, "soft rock, GENERATED");
        assert_eq!(result.span, Some(11..20));
    }

    #[test]
    fn match_cannot_run_into_protected_range() {
        let result = replace_fuzzy_excluding("Sigur Ros", "Sigur Rós", "X", &[6..9]);
        assert!(!result.replaced);
        assert_eq!(result.text, "Sigur Ros");
    }

    #[test]
    fn shift_ranges_moves_only_later_ranges() {
        let mut ranges = vec![0..4, 10..14];
        shift_ranges(&mut ranges, 5..8, 7);
        assert_eq!(ranges, vec![0..4, 14..18]);
    }
}
