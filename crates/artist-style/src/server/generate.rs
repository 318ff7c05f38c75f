//! Style generation proxy and API key endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::provider::{ProviderKind, ProviderModel};
use crate::server::artists::MessageResponse;
use crate::server::error::ApiError;
use crate::server::ServerState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStyleRequest {
    #[serde(default)]
    pub artist_name: Option<String>,
    /// Model id; the server default when absent.
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Only checked when present.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStyleResponse {
    pub artist_name: String,
    pub generated_style: String,
    pub provider: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveApiKeyRequest {
    /// Model id (`gemini-2.0-flash`) or vendor name (`google`).
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// POST /api/generate-style
pub(crate) async fn generate_style(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<GenerateStyleRequest>,
) -> Result<Json<GenerateStyleResponse>, ApiError> {
    if let Some(password) = payload.password.as_deref().filter(|value| !value.is_empty()) {
        state.authorize(Some(password))?;
    }

    let artist_name = payload.artist_name.as_deref().map(str::trim).unwrap_or_default();
    if artist_name.is_empty() {
        return Err(ApiError::bad_request("Artist name is required"));
    }

    let model = ProviderModel::parse(
        payload
            .llm_provider
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(&state.default_model),
    )?;

    let api_key = match payload.api_key.filter(|key| !key.trim().is_empty()) {
        Some(key) => {
            tracing::info!("using API key provided in request for {}", model.model);
            key
        }
        None => state.keys.load(model.kind).await.unwrap_or_default(),
    };

    let generated_style = state
        .providers
        .generate_style(&model, &api_key, artist_name)
        .await
        .inspect_err(|error| tracing::error!("style generation failed for {artist_name}: {error}"))?;

    Ok(Json(GenerateStyleResponse {
        artist_name: artist_name.to_string(),
        generated_style,
        provider: model.model,
    }))
}

/// POST /save-api-key
pub(crate) async fn save_api_key(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<SaveApiKeyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.authorize(payload.password.as_deref())?;

    let provider = payload.provider.as_deref().map(str::trim).unwrap_or_default();
    let api_key = payload.api_key.as_deref().map(str::trim).unwrap_or_default();
    if provider.is_empty() || api_key.is_empty() {
        return Err(ApiError::bad_request("Provider and API key are required"));
    }

    let kind = match ProviderKind::from_vendor(provider) {
        Some(kind) => kind,
        None => ProviderKind::from_model(provider)?,
    };
    state.keys.save(kind, api_key).await?;
    Ok(Json(MessageResponse {
        message: "API key saved successfully".to_string(),
    }))
}
