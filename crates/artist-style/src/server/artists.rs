//! Dictionary read and admin endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::dictionary::StyleDictionary;
use crate::error::StyleError;
use crate::server::error::ApiError;
use crate::server::ServerState;

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertArtistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkArtistsRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub artists: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArtistResponse {
    pub name: String,
    pub style: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpsertArtistResponse {
    pub message: String,
    pub name: String,
    pub style: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkResponse {
    pub count: usize,
}

/// GET /api/artists
pub(crate) async fn list(State(state): State<Arc<ServerState>>) -> Json<StyleDictionary> {
    Json(state.artists.read().await)
}

/// GET /api/artists/:name
///
/// Looks the name up in normalized form, so `Beyonce` finds `Beyoncé`.
pub(crate) async fn get_one(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> Result<Json<ArtistResponse>, ApiError> {
    let dictionary = state.artists.read().await;
    let (name, style) = dictionary
        .find_key(&name)
        .and_then(|key| dictionary.artists.get_key_value(key))
        .ok_or_else(|| ApiError::not_found("Artist not found"))?;
    Ok(Json(ArtistResponse {
        name: name.clone(),
        style: style.clone(),
    }))
}

/// POST /api/artists
pub(crate) async fn upsert(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<UpsertArtistRequest>,
) -> Result<Json<UpsertArtistResponse>, ApiError> {
    state.authorize(payload.password.as_deref())?;
    let name = payload.name.unwrap_or_default();
    let style = payload.style.unwrap_or_default();
    let key = state
        .artists
        .update(|dictionary| dictionary.upsert(&name, &style, Utc::now()))
        .await?;
    tracing::info!("artist saved: {key}");
    Ok(Json(UpsertArtistResponse {
        message: "Artist added/updated successfully".to_string(),
        name: key,
        style: style.trim().to_string(),
    }))
}

/// DELETE /api/artists/:name
pub(crate) async fn remove(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    payload: Option<Json<PasswordRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let password = payload.and_then(|Json(body)| body.password);
    state.authorize(password.as_deref())?;
    let key = state
        .artists
        .update(|dictionary| dictionary.remove(&name))
        .await?;
    tracing::info!("artist deleted: {key}");
    Ok(Json(MessageResponse {
        message: "Artist deleted successfully".to_string(),
    }))
}

/// POST /api/toggle
pub(crate) async fn toggle(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<PasswordRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    state.authorize(payload.password.as_deref())?;
    let enabled = state
        .artists
        .update(|dictionary| Ok::<_, StyleError>(dictionary.toggle()))
        .await?;
    tracing::info!("artist replacement enabled: {enabled}");
    Ok(Json(ToggleResponse { enabled }))
}

/// POST /api/artists/bulk
pub(crate) async fn bulk(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<BulkArtistsRequest>,
) -> Result<Json<BulkResponse>, ApiError> {
    state.authorize(payload.password.as_deref())?;
    if payload.artists.is_empty() {
        return Err(ApiError::bad_request("Artists object is required"));
    }
    let count = state
        .artists
        .update(|dictionary| Ok::<_, StyleError>(dictionary.merge(&payload.artists, Utc::now())))
        .await?;
    tracing::info!("bulk upload wrote {count} artists");
    Ok(Json(BulkResponse { count }))
}

/// POST /api/artists/clear
pub(crate) async fn clear(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<PasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.authorize(payload.password.as_deref())?;
    state
        .artists
        .update(|dictionary| {
            dictionary.clear();
            Ok::<_, StyleError>(())
        })
        .await?;
    tracing::info!("all artists cleared");
    Ok(Json(MessageResponse {
        message: "All artists cleared".to_string(),
    }))
}
