//! Prompt-wide generation: every candidate name in a prompt is sent to a
//! style source and, when a style comes back, substituted in place.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{StyleError, StyleResult};
use crate::extract::extract_candidates;
use crate::matcher::whole_word_pattern;

/// Produces a style description for a candidate name.
///
/// `Ok(None)` means the source had nothing for the name; errors are treated
/// the same way by [`generate`] after being logged.
#[async_trait]
pub trait StyleSource: Send + Sync {
    async fn style_for(&self, candidate: &str) -> StyleResult<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub text: String,
    /// Candidates that were actually substituted, in extraction order.
    pub replaced_names: Vec<String>,
}

impl GenerationOutcome {
    pub fn replaced_count(&self) -> usize {
        self.replaced_names.len()
    }
}

/// Message-shaped result handed back to a host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<StyleResult<GenerationOutcome>> for GenerationResponse {
    fn from(result: StyleResult<GenerationOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                replaced_count: Some(outcome.replaced_count()),
                result: Some(outcome.text),
                replaced: Some(outcome.replaced_names),
                error: None,
            },
            Err(error) => Self {
                success: false,
                result: None,
                replaced_count: None,
                replaced: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Runs generation for every candidate in `prompt`, one at a time.
///
/// Candidates are processed sequentially in extraction order because each
/// substitution works on the text produced by the previous one. A failing
/// candidate is logged and skipped; only a run with zero substitutions is an
/// error.
pub async fn generate_styles(prompt: &str, source: &dyn StyleSource) -> StyleResult<GenerationOutcome> {
    let candidates = extract_candidates(prompt);
    if candidates.is_empty() {
        return Err(StyleError::NoArtistsDetected);
    }
    tracing::info!("detected potential artists: {candidates:?}");

    let mut text = prompt.to_string();
    let mut replaced_names = Vec::new();

    for candidate in candidates {
        let style = match source.style_for(&candidate).await {
            Ok(Some(style)) => style,
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!("failed to generate for {candidate}: {error}");
                continue;
            }
        };

        let Some(pattern) = whole_word_pattern(&candidate) else {
            continue;
        };
        if !pattern.is_match(&text) {
            tracing::debug!("generated style for {candidate} but the name is no longer in the prompt");
            continue;
        }
        text = pattern
            .replace_all(&text, regex::NoExpand(style.as_str()))
            .into_owned();
        tracing::info!("replaced: {candidate}");
        replaced_names.push(candidate);
    }

    if replaced_names.is_empty() {
        return Err(StyleError::NoStyleGenerated);
    }

    Ok(GenerationOutcome {
        text,
        replaced_names,
    })
}
