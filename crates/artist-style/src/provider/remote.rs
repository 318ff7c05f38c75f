//! Style source backed by the proxy's generation endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StyleError, StyleResult};
use crate::generate::StyleSource;
use crate::provider::http::upstream_error_message;

const GENERATE_ENDPOINT: &str = "/api/generate-style";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateStyleRequest<'a> {
    artist_name: &'a str,
    llm_provider: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateStyleResponse {
    generated_style: Option<String>,
}

/// Asks the proxy's `/api/generate-style` endpoint for each candidate.
pub struct RemoteStyleSource {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl RemoteStyleSource {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl StyleSource for RemoteStyleSource {
    async fn style_for(&self, candidate: &str) -> StyleResult<Option<String>> {
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), GENERATE_ENDPOINT);
        let response = self
            .client
            .post(&url)
            .json(&GenerateStyleRequest {
                artist_name: candidate,
                llm_provider: &self.model,
                api_key: &self.api_key,
            })
            .send()
            .await
            .map_err(|e| StyleError::Provider(format!("Generation failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StyleError::Provider(upstream_error_message(status.as_u16(), &body)));
        }

        let body: GenerateStyleResponse = response
            .json()
            .await
            .map_err(|e| StyleError::Provider(format!("invalid generation response: {e}")))?;
        Ok(body
            .generated_style
            .map(|style| style.trim().to_string())
            .filter(|style| !style.is_empty()))
    }
}
