//! Host-facing facade over the dictionary cache, the matchers and a style source.

use std::ops::Range;
use std::sync::Arc;

use crate::cache::DictionaryCache;
use crate::error::{StyleError, StyleResult};
use crate::extract::extract_candidates;
use crate::generate::{generate_styles, GenerationOutcome, StyleSource};
use crate::matcher::{replace_fuzzy_excluding, replace_known, shift_ranges, DirectReplacement};
use crate::normalize::normalize_name;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub text: String,
    /// Dictionary names substituted, in the order they were applied.
    pub replaced_names: Vec<String>,
    /// Candidates filled in by the style source.
    pub generated_names: Vec<String>,
}

impl ApplyOutcome {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Entry point for hosts: dictionary cache plus an optional generator.
#[derive(Clone)]
pub struct StyleEngine {
    cache: Arc<DictionaryCache>,
    source: Option<Arc<dyn StyleSource>>,
}

impl StyleEngine {
    pub fn new(cache: Arc<DictionaryCache>) -> Self {
        Self { cache, source: None }
    }

    pub fn with_source(mut self, source: Arc<dyn StyleSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn cache(&self) -> &Arc<DictionaryCache> {
        &self.cache
    }

    pub async fn replace_known(&self, text: &str) -> StyleResult<DirectReplacement> {
        let dictionary = self.cache.get().await?;
        Ok(replace_known(text, &dictionary))
    }

    /// Like [`Self::replace_known`], but an unreachable dictionary leaves the
    /// text as typed.
    pub async fn replace_or_passthrough(&self, text: &str) -> DirectReplacement {
        match self.replace_known(text).await {
            Ok(replacement) => replacement,
            Err(error) => {
                tracing::warn!("artist replacement skipped: {error}");
                DirectReplacement::unchanged(text)
            }
        }
    }

    pub async fn generate(&self, text: &str) -> StyleResult<GenerationOutcome> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| StyleError::InvalidInput("no style source configured".to_string()))?;
        generate_styles(text, source).await
    }

    /// Known names first, then spelling variants of known names, then
    /// whatever the style source can fill in for the remaining candidates.
    ///
    /// Style text inserted by an earlier step is never matched again.
    pub async fn apply(&self, text: &str) -> StyleResult<ApplyOutcome> {
        let dictionary = self.cache.get().await?;
        if !dictionary.enabled {
            return Ok(ApplyOutcome::unchanged(text));
        }

        let direct = replace_known(text, &dictionary);
        let mut styled = direct.styled;
        let mut outcome = ApplyOutcome {
            text: direct.text,
            replaced_names: direct.replaced_names,
            generated_names: Vec::new(),
        };
        let handled: Vec<String> = outcome
            .replaced_names
            .iter()
            .map(|name| normalize_name(name))
            .collect();

        for candidate in extract_candidates(text) {
            if handled.contains(&normalize_name(&candidate)) {
                continue;
            }

            if let Some((key, style)) = dictionary
                .find_key(&candidate)
                .and_then(|key| dictionary.artists.get_key_value(key))
            {
                if insert_style(&mut outcome.text, &mut styled, &candidate, style) {
                    outcome.replaced_names.push(key.clone());
                }
                continue;
            }

            let Some(source) = self.source.as_deref() else {
                continue;
            };
            let style = match source.style_for(&candidate).await {
                Ok(Some(style)) => style,
                Ok(None) => continue,
                Err(error) => {
                    tracing::warn!("failed to generate for {candidate}: {error}");
                    continue;
                }
            };
            if insert_style(&mut outcome.text, &mut styled, &candidate, &style) {
                outcome.generated_names.push(candidate);
            }
        }

        Ok(outcome)
    }
}

/// Fuzzy-substitutes `candidate` outside the `styled` ranges and records the
/// new style range.
fn insert_style(text: &mut String, styled: &mut Vec<Range<usize>>, candidate: &str, style: &str) -> bool {
    let replacement = replace_fuzzy_excluding(text.as_str(), candidate, style, styled.as_slice());
    let Some(inserted) = replacement.span else {
        return false;
    };
    let removed_len = text.len() + inserted.len() - replacement.text.len();
    shift_ranges(styled, inserted.start..inserted.start + removed_len, inserted.len());
    styled.push(inserted);
    *text = replacement.text;
    true
}
