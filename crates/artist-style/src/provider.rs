//! LLM providers that turn an artist name into a style description.

pub mod http;
pub mod remote;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StyleError, StyleResult};
use crate::generate::StyleSource;

pub use http::{AnthropicGenerator, GeminiGenerator, OpenAiCompatibleGenerator};
pub use remote::RemoteStyleSource;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;

/// Backend family, resolved once from a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Claude,
    #[serde(rename = "openai")]
    OpenAI,
    Grok,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::Claude,
        ProviderKind::OpenAI,
        ProviderKind::Grok,
    ];

    /// `gemini*` → Gemini, `claude*` → Claude, `gpt*`/`o*` → OpenAI,
    /// `grok*` → Grok.
    pub fn from_model(model: &str) -> StyleResult<Self> {
        let model = model.trim().to_ascii_lowercase();
        if model.starts_with("gemini") {
            Ok(ProviderKind::Gemini)
        } else if model.starts_with("claude") {
            Ok(ProviderKind::Claude)
        } else if model.starts_with("grok") {
            Ok(ProviderKind::Grok)
        } else if model.starts_with("gpt") || model.starts_with('o') {
            Ok(ProviderKind::OpenAI)
        } else {
            Err(StyleError::InvalidInput(format!(
                "Unsupported LLM provider: {model}"
            )))
        }
    }

    /// Vendor name used to key stored API keys.
    pub fn vendor(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "google",
            ProviderKind::Claude => "anthropic",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Grok => "xai",
        }
    }

    pub fn from_vendor(vendor: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.vendor().eq_ignore_ascii_case(vendor.trim()))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Claude => write!(f, "claude"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Grok => write!(f, "grok"),
        }
    }
}

/// A model id together with the provider it dispatches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderModel {
    pub kind: ProviderKind,
    pub model: String,
}

impl ProviderModel {
    pub fn parse(model: &str) -> StyleResult<Self> {
        let model = model.trim();
        Ok(Self {
            kind: ProviderKind::from_model(model)?,
            model: model.to_string(),
        })
    }
}

/// Raw completion call against one provider backend.
#[async_trait]
pub trait StyleGenerator: Send + Sync {
    async fn complete(&self, model: &str, api_key: &str, prompt: &str) -> StyleResult<String>;
}

/// Lookup table from provider kind to its backend.
#[derive(Clone, Default)]
pub struct ProviderTable {
    generators: HashMap<ProviderKind, Arc<dyn StyleGenerator>>,
}

impl ProviderTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table wired to the public provider APIs.
    pub fn http() -> StyleResult<Self> {
        let client = http::provider_client()?;
        Ok(Self::empty()
            .with(ProviderKind::Gemini, Arc::new(GeminiGenerator::new(client.clone())))
            .with(ProviderKind::Claude, Arc::new(AnthropicGenerator::new(client.clone())))
            .with(ProviderKind::OpenAI, Arc::new(OpenAiCompatibleGenerator::openai(client.clone())))
            .with(ProviderKind::Grok, Arc::new(OpenAiCompatibleGenerator::xai(client))))
    }

    pub fn with(mut self, kind: ProviderKind, generator: Arc<dyn StyleGenerator>) -> Self {
        self.generators.insert(kind, generator);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> StyleResult<&Arc<dyn StyleGenerator>> {
        self.generators
            .get(&kind)
            .ok_or_else(|| StyleError::InvalidInput(format!("no backend registered for {kind}")))
    }

    /// Generates a cleaned style description for `subject`.
    pub async fn generate_style(
        &self,
        model: &ProviderModel,
        api_key: &str,
        subject: &str,
    ) -> StyleResult<String> {
        if api_key.trim().is_empty() {
            return Err(StyleError::InvalidInput(
                "API key is required. Please enter your API key in the admin panel.".to_string(),
            ));
        }
        let generator = self.get(model.kind)?;
        tracing::info!("sending style prompt to {} ({})", model.kind, model.model);
        let raw = generator
            .complete(&model.model, api_key.trim(), &style_prompt(subject))
            .await?;
        let style = clean_generated_style(&raw);
        if style.is_empty() {
            return Err(StyleError::Provider("no content generated".to_string()));
        }
        tracing::info!("generated style for {subject}: {style}");
        Ok(style)
    }
}

/// Calls a provider directly for each candidate.
pub struct ProviderStyleSource {
    table: Arc<ProviderTable>,
    model: ProviderModel,
    api_key: String,
}

impl ProviderStyleSource {
    pub fn new(table: Arc<ProviderTable>, model: ProviderModel, api_key: impl Into<String>) -> Self {
        Self {
            table,
            model,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl StyleSource for ProviderStyleSource {
    async fn style_for(&self, candidate: &str) -> StyleResult<Option<String>> {
        self.table
            .generate_style(&self.model, &self.api_key, candidate)
            .await
            .map(Some)
    }
}

/// Strips one surrounding quote on each side and trims.
pub fn clean_generated_style(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix(['"', '\''])
        .unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_suffix(['"', '\''])
        .unwrap_or(trimmed);
    trimmed.trim().to_string()
}

pub fn style_prompt(subject: &str) -> String {
    format!(
        r#"You are an expert music analyst and Suno AI style descriptor. Your job is to analyze artists and create detailed, accurate style descriptions for music generation.

CRITICAL INSTRUCTIONS:
1. Create a comma-separated description that captures the EXACT musical characteristics
2. Focus on: Genre, Sub-genre, Tempo feel, Instrumentation, Vocal style, Mood, Production style
3. Be SPECIFIC and DETAILED - avoid generic terms
4. Include technical music terms when relevant
5. Keep it concise but comprehensive (aim for 8-15 descriptive elements)
6. Do NOT include the artist name in the output
7. Do NOT use phrases like "in the style of" or "similar to"
8. Output ONLY the comma-separated style description, no quotes, no explanations
9. This can be used for a single artist or as part of processing multiple artists in a prompt

FORMAT RULES:
- Comma-separated list
- Start with main genre(s)
- Include specific instruments
- Describe vocal characteristics (if applicable)
- Add mood/feeling descriptors
- Include tempo indicators (e.g., upbeat, slow, moderate)
- Mention production style (e.g., polished, raw, lo-fi, orchestral)

EXAMPLES OF GOOD OUTPUT:
Pop Rock, Piano-driven, Storytelling lyrics, Upbeat, Male vocals, 80s production, Melodic, Catchy hooks, Anthemic choruses
Soul, Emotional, Torch-Lounge, Powerful female vocals, Gospel influences, R&B elements, Melancholic, Piano and strings
Alternative Rock, Grunge, Dark, Melodic, Heavy guitar riffs, Baritone male vocals, 90s Seattle sound, Introspective
EDM, Melodic, Euphoric, Build-ups and drops, Synth-heavy, Festival anthems, Emotional vocal samples, Progressive house

EXAMPLES OF BAD OUTPUT:
Like Billy Joel
Similar to Adele's style
Pop music (too vague)
Great artist with amazing voice (not descriptive)

Artist: {subject}

Generate ONLY the detailed, comma-separated style description:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoGenerator {
        reply: &'static str,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl EchoGenerator {
        fn new(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl StyleGenerator for EchoGenerator {
        async fn complete(&self, model: &str, api_key: &str, _prompt: &str) -> StyleResult<String> {
            self.seen
                .lock()
                .expect("seen lock")
                .push((model.to_string(), api_key.to_string()));
            Ok(self.reply.to_string())
        }
    }

    #[test]
    fn resolves_kind_from_model_prefix() {
        assert_eq!(ProviderKind::from_model("gemini-2.0-flash").expect("gemini"), ProviderKind::Gemini);
        assert_eq!(ProviderKind::from_model("claude-3-5-sonnet").expect("claude"), ProviderKind::Claude);
        assert_eq!(ProviderKind::from_model("gpt-4o-mini").expect("gpt"), ProviderKind::OpenAI);
        assert_eq!(ProviderKind::from_model("o1-mini").expect("o1"), ProviderKind::OpenAI);
        assert_eq!(ProviderKind::from_model("grok-2").expect("grok"), ProviderKind::Grok);
        assert!(matches!(
            ProviderKind::from_model("llama-3"),
            Err(StyleError::InvalidInput(_))
        ));
    }

    #[test]
    fn vendor_names_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::from_vendor(kind.vendor()), Some(kind));
        }
        assert_eq!(ProviderKind::from_vendor("unknown"), None);
    }

    #[test]
    fn cleans_quotes_and_whitespace() {
        assert_eq!(clean_generated_style("\"Soul, Piano\""), "Soul, Piano");
        assert_eq!(clean_generated_style("  'Trap, Moody'\n"), "Trap, Moody");
        assert_eq!(clean_generated_style("Rock \"n\" Roll"), "Rock \"n\" Roll");
    }

    #[test]
    fn prompt_names_the_subject() {
        assert!(style_prompt("Billie Eilish").contains("Artist: Billie Eilish"));
    }

    #[tokio::test]
    async fn dispatches_through_table() {
        let claude = EchoGenerator::new("\"Soul, Piano\"");
        let table = ProviderTable::empty().with(ProviderKind::Claude, claude.clone());
        let model = ProviderModel::parse("claude-3-haiku").expect("model");

        let style = table
            .generate_style(&model, " key ", "Adele")
            .await
            .expect("style");
        assert_eq!(style, "Soul, Piano");
        let seen = claude.seen.lock().expect("seen lock").clone();
        assert_eq!(seen, vec![("claude-3-haiku".to_string(), "key".to_string())]);
    }

    #[tokio::test]
    async fn missing_backend_or_key_is_invalid_input() {
        let table = ProviderTable::empty();
        let model = ProviderModel::parse("gpt-4o").expect("model");
        assert!(matches!(
            table.generate_style(&model, "key", "Adele").await,
            Err(StyleError::InvalidInput(_))
        ));
        assert!(matches!(
            table.generate_style(&model, "  ", "Adele").await,
            Err(StyleError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn empty_completion_is_provider_error() {
        let table = ProviderTable::empty().with(ProviderKind::Grok, EchoGenerator::new("''"));
        let model = ProviderModel::parse("grok-beta").expect("model");
        assert_eq!(
            table.generate_style(&model, "key", "Adele").await,
            Err(StyleError::Provider("no content generated".to_string()))
        );
    }

    #[tokio::test]
    async fn provider_source_wraps_style() {
        let table = Arc::new(ProviderTable::empty().with(ProviderKind::Gemini, EchoGenerator::new("Soul")));
        let source = ProviderStyleSource::new(
            table,
            ProviderModel::parse(DEFAULT_MODEL).expect("model"),
            "key",
        );
        assert_eq!(source.style_for("Adele").await, Ok(Some("Soul".to_string())));
    }
}
