//! Host-side settings kept in the key-value store.
//!
//! The key names match what the browser hosts already persist, so a store
//! written by one host can be read by another.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::cache::CacheConfig;
use crate::error::StyleResult;
use crate::fetch::DEFAULT_API_URL;
use crate::provider::{ProviderKind, ProviderModel, DEFAULT_MODEL};
use crate::storage::KvStore;

pub const API_URL_KEY: &str = "apiUrl";
pub const LLM_PROVIDER_KEY: &str = "llmProvider";
pub const AUTO_REPLACE_KEY: &str = "autoReplaceEnabled";

/// Store key for a vendor's API key, e.g. `apiKey_google`.
pub fn api_key_entry(kind: ProviderKind) -> String {
    format!("apiKey_{}", kind.vendor())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: Option<String>,
    /// Selected model id, e.g. `gemini-2.0-flash`.
    pub llm_provider: Option<String>,
    pub auto_replace: bool,
    pub api_keys: HashMap<ProviderKind, String>,
}

impl ClientSettings {
    pub async fn load(store: &dyn KvStore) -> StyleResult<Self> {
        let key_entries: Vec<String> = ProviderKind::ALL.iter().map(|kind| api_key_entry(*kind)).collect();
        let mut keys: Vec<&str> = vec![API_URL_KEY, LLM_PROVIDER_KEY, AUTO_REPLACE_KEY];
        keys.extend(key_entries.iter().map(String::as_str));

        let stored = store.get(&keys).await?;
        let text = |key: &str| {
            stored
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let api_keys = ProviderKind::ALL
            .iter()
            .filter_map(|kind| text(&api_key_entry(*kind)).map(|key| (*kind, key)))
            .collect();

        Ok(Self {
            api_url: text(API_URL_KEY),
            llm_provider: text(LLM_PROVIDER_KEY),
            auto_replace: stored
                .get(AUTO_REPLACE_KEY)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            api_keys,
        })
    }

    pub async fn save(&self, store: &dyn KvStore) -> StyleResult<()> {
        let mut entries = Map::new();
        if let Some(api_url) = &self.api_url {
            entries.insert(API_URL_KEY.to_string(), Value::String(api_url.clone()));
        }
        if let Some(provider) = &self.llm_provider {
            entries.insert(LLM_PROVIDER_KEY.to_string(), Value::String(provider.clone()));
        }
        entries.insert(AUTO_REPLACE_KEY.to_string(), Value::Bool(self.auto_replace));
        for (kind, key) in &self.api_keys {
            entries.insert(api_key_entry(*kind), Value::String(key.clone()));
        }
        store.set(entries).await
    }

    /// Stores the model selection together with the key for its vendor.
    pub async fn save_api_key(store: &dyn KvStore, model: &ProviderModel, api_key: &str) -> StyleResult<()> {
        let mut entries = Map::new();
        entries.insert(LLM_PROVIDER_KEY.to_string(), Value::String(model.model.clone()));
        entries.insert(
            api_key_entry(model.kind),
            Value::String(api_key.trim().to_string()),
        );
        store.set(entries).await
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn model(&self) -> StyleResult<ProviderModel> {
        ProviderModel::parse(self.llm_provider.as_deref().unwrap_or(DEFAULT_MODEL))
    }

    pub fn api_key_for(&self, kind: ProviderKind) -> Option<&str> {
        self.api_keys.get(&kind).map(String::as_str)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default().with_base_url(self.api_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use serde_json::json;

    #[tokio::test]
    async fn empty_store_uses_defaults() {
        let store = MemoryKvStore::new();
        let settings = ClientSettings::load(&store).await.expect("load");
        assert_eq!(settings.api_url(), DEFAULT_API_URL);
        assert_eq!(settings.model().expect("model").kind, ProviderKind::Gemini);
        assert!(!settings.auto_replace);
        assert!(settings.api_keys.is_empty());
    }

    #[tokio::test]
    async fn reads_host_keys() {
        let store = MemoryKvStore::new();
        let mut entries = Map::new();
        entries.insert("apiUrl".to_string(), json!("http://localhost:3000"));
        entries.insert("llmProvider".to_string(), json!("claude-3-5-sonnet"));
        entries.insert("apiKey_anthropic".to_string(), json!(" sk-ant "));
        entries.insert("apiKey_google".to_string(), json!(""));
        entries.insert("autoReplaceEnabled".to_string(), json!(true));
        store.set(entries).await.expect("seed");

        let settings = ClientSettings::load(&store).await.expect("load");
        assert_eq!(settings.api_url(), "http://localhost:3000");
        assert_eq!(settings.model().expect("model").kind, ProviderKind::Claude);
        assert_eq!(settings.api_key_for(ProviderKind::Claude), Some("sk-ant"));
        assert_eq!(settings.api_key_for(ProviderKind::Gemini), None);
        assert!(settings.auto_replace);
        assert_eq!(settings.cache_config().base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = MemoryKvStore::new();
        let model = ProviderModel::parse("grok-2").expect("model");
        ClientSettings::save_api_key(&store, &model, "xai-key").await.expect("save key");

        let mut settings = ClientSettings::load(&store).await.expect("load");
        assert_eq!(settings.api_key_for(ProviderKind::Grok), Some("xai-key"));
        settings.api_url = Some("http://proxy.local".to_string());
        settings.save(&store).await.expect("save");

        let reloaded = ClientSettings::load(&store).await.expect("reload");
        assert_eq!(reloaded, settings);
    }
}
