//! TTL cache of the style dictionary, persisted through the host's key-value
//! store.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Map;
use tokio::sync::Mutex;

use crate::dictionary::StyleDictionary;
use crate::error::{StyleError, StyleResult};
use crate::fetch::{DictionaryFetcher, DEFAULT_API_URL};
use crate::storage::SharedKvStore;

pub const CACHE_KEY: &str = "artistsCache";
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Proxy location the dictionary is fetched from.
    pub base_url: String,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Persisted snapshot, stored as `{ "data": ..., "timestamp": <epoch ms> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: StyleDictionary,
    #[serde(rename = "timestamp")]
    pub fetched_at: i64,
}

impl CacheEntry {
    /// Fresh while `0 <= now - fetched_at < ttl`. A timestamp from the
    /// future counts as stale.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let age = now_ms - self.fetched_at;
        age >= 0 && (age as u128) < ttl.as_millis()
    }
}

/// Source of the current time in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp_millis())
}

pub struct DictionaryCache {
    config: CacheConfig,
    fetcher: Arc<dyn DictionaryFetcher>,
    store: SharedKvStore,
    clock: Clock,
    refresh: Mutex<()>,
}

impl DictionaryCache {
    pub fn new(config: CacheConfig, fetcher: Arc<dyn DictionaryFetcher>, store: SharedKvStore) -> Self {
        Self::with_clock(config, fetcher, store, system_clock())
    }

    pub fn with_clock(
        config: CacheConfig,
        fetcher: Arc<dyn DictionaryFetcher>,
        store: SharedKvStore,
        clock: Clock,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            clock,
            refresh: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current dictionary, refetched synchronously once the persisted entry
    /// is older than the TTL. Fetch failures are returned, never masked by
    /// stale data.
    pub async fn get(&self) -> StyleResult<StyleDictionary> {
        if let Some(data) = self.fresh_entry().await {
            return Ok(data);
        }

        // Concurrent callers wait here; the first one refreshes.
        let _guard = self.refresh.lock().await;
        if let Some(data) = self.fresh_entry().await {
            return Ok(data);
        }

        let data = self
            .fetcher
            .fetch_dictionary(&self.config.base_url)
            .await
            .map_err(|error| match error {
                StyleError::FetchFailed(message) => StyleError::FetchFailed(message),
                other => StyleError::FetchFailed(other.to_string()),
            })?;

        let entry = CacheEntry {
            data,
            fetched_at: (self.clock)(),
        };
        if let Err(error) = self.persist(&entry).await {
            tracing::warn!("failed to persist artists cache: {error}");
        }
        Ok(entry.data)
    }

    /// Last persisted entry, fresh or not, without touching the network.
    pub async fn peek(&self) -> Option<CacheEntry> {
        self.load_entry().await
    }

    /// Drops the persisted entry so the next `get` refetches.
    pub async fn invalidate(&self) -> StyleResult<()> {
        self.store.remove(&[CACHE_KEY]).await
    }

    async fn fresh_entry(&self) -> Option<StyleDictionary> {
        let entry = self.load_entry().await?;
        if entry.is_fresh((self.clock)(), self.config.ttl) {
            tracing::debug!("using cached artists data");
            Some(entry.data)
        } else {
            None
        }
    }

    async fn load_entry(&self) -> Option<CacheEntry> {
        let stored = match self.store.get(&[CACHE_KEY]).await {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!("failed to read artists cache: {error}");
                return None;
            }
        };
        let value = stored.get(CACHE_KEY)?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value::<CacheEntry>(value.clone()) {
            Ok(entry) => Some(entry),
            Err(error) => {
                tracing::warn!("ignoring unreadable artists cache: {error}");
                None
            }
        }
    }

    async fn persist(&self, entry: &CacheEntry) -> StyleResult<()> {
        let value = serde_json::to_value(entry)
            .map_err(|e| StyleError::Internal(format!("cache serialize error: {e}")))?;
        let mut entries = Map::new();
        entries.insert(CACHE_KEY.to_string(), value);
        self.store.set(entries).await
    }
}
