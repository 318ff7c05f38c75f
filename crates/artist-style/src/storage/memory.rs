use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::StyleResult;
use crate::storage::KvStore;

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: RwLock<Map<String, Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, keys: &[&str]) -> StyleResult<Map<String, Value>> {
        let data = self.data.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| data.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> StyleResult<()> {
        self.data.write().await.extend(entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> StyleResult<()> {
        let mut data = self.data.write().await;
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_missing_returns_empty() {
        let kv = MemoryKvStore::new();
        let found = kv.get(&["nonexistent"]).await.expect("get");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn set_and_get_subset() {
        let kv = MemoryKvStore::new();
        let mut entries = Map::new();
        entries.insert("apiUrl".to_string(), json!("http://localhost:3000"));
        entries.insert("llmProvider".to_string(), json!("gpt-4o"));
        kv.set(entries).await.expect("set");

        let found = kv.get(&["apiUrl", "missing"]).await.expect("get");
        assert_eq!(found.len(), 1);
        assert_eq!(found.get("apiUrl"), Some(&json!("http://localhost:3000")));
    }

    #[tokio::test]
    async fn remove_drops_keys() {
        let kv = MemoryKvStore::new();
        let mut entries = Map::new();
        entries.insert("artistsCache".to_string(), json!({ "timestamp": 1 }));
        kv.set(entries).await.expect("set");
        kv.remove(&["artistsCache"]).await.expect("remove");
        assert!(kv.get(&["artistsCache"]).await.expect("get").is_empty());
    }
}
