//! reqwest-backed provider calls.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StyleError, StyleResult};
use crate::provider::{StyleGenerator, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const XAI_BASE_URL: &str = "https://api.x.ai/v1";
const PROVIDER_TIMEOUT_SECS: u64 = 60;

pub(crate) fn provider_client() -> StyleResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
        .build()
        .map_err(|e| StyleError::Internal(format!("failed to build http client: {e}")))
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// --- Gemini ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, GEMINI_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StyleGenerator for GeminiGenerator {
    async fn complete(&self, model: &str, api_key: &str, prompt: &str) -> StyleResult<String> {
        let url = format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        );
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: DEFAULT_TEMPERATURE,
                max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            },
        };
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| StyleError::Provider(format!("Gemini request failed: {e}")))?;
        let body: GeminiResponse = read_success(response).await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(no_content)
    }
}

// --- Anthropic ---

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

pub struct AnthropicGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicGenerator {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StyleGenerator for AnthropicGenerator {
    async fn complete(&self, model: &str, api_key: &str, prompt: &str) -> StyleResult<String> {
        let request = AnthropicRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        };
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| StyleError::Provider(format!("Claude request failed: {e}")))?;
        let body: AnthropicResponse = read_success(response).await?;
        body.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(no_content)
    }
}

// --- OpenAI and X.AI (same wire format) ---

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiCompatibleGenerator {
    client: reqwest::Client,
    base_url: String,
    label: &'static str,
}

impl OpenAiCompatibleGenerator {
    pub fn openai(client: reqwest::Client) -> Self {
        Self::with_base_url(client, OPENAI_BASE_URL, "OpenAI")
    }

    pub fn xai(client: reqwest::Client) -> Self {
        Self::with_base_url(client, XAI_BASE_URL, "Grok")
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        label: &'static str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            label,
        }
    }
}

#[async_trait]
impl StyleGenerator for OpenAiCompatibleGenerator {
    async fn complete(&self, model: &str, api_key: &str, prompt: &str) -> StyleResult<String> {
        let request = ChatCompletionRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        };
        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StyleError::Provider(format!("{} request failed: {e}", self.label)))?;
        let body: ChatCompletionResponse = read_success(response).await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(no_content)
    }
}

fn no_content() -> StyleError {
    StyleError::Provider("no content generated".to_string())
}

/// Parses a success body, or turns an error status into a provider error
/// carrying the upstream `error.message` when there is one.
async fn read_success<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> StyleResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StyleError::Provider(upstream_error_message(status.as_u16(), &body)));
    }
    response
        .json()
        .await
        .map_err(|e| StyleError::Provider(format!("failed to parse provider response: {e}")))
}

pub(crate) fn upstream_error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        value
            .pointer("/error/message")
            .and_then(Value::as_str)
            .or_else(|| value.get("error").and_then(Value::as_str))
    });
    match message {
        Some(message) => message.to_string(),
        None => format!("API error {status}: {body}"),
    }
}
