use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{StyleError, StyleResult};
use crate::storage::KvStore;

/// Key-value store persisted as one JSON object file.
pub struct FileKvStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StyleResult<Map<String, Value>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => {
                return Err(StyleError::Storage(format!(
                    "failed to read store file {}: {error}",
                    self.path.display()
                )))
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StyleError::Storage(format!(
                "store file {} is not a JSON object",
                self.path.display()
            ))),
            Err(error) => Err(StyleError::Storage(format!("store parse error: {error}"))),
        }
    }

    async fn save(&self, data: &Map<String, Value>) -> StyleResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                StyleError::Storage(format!(
                    "failed to create store directory {}: {error}",
                    parent.display()
                ))
            })?;
        }
        let serialized = serde_json::to_vec_pretty(data)
            .map_err(|error| StyleError::Storage(format!("store serialize error: {error}")))?;
        tokio::fs::write(&self.path, serialized)
            .await
            .map_err(|error| {
                StyleError::Storage(format!(
                    "failed to write store file {}: {error}",
                    self.path.display()
                ))
            })
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, keys: &[&str]) -> StyleResult<Map<String, Value>> {
        let _guard = self.lock.lock().await;
        let data = self.load().await?;
        Ok(keys
            .iter()
            .filter_map(|key| data.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> StyleResult<()> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;
        data.extend(entries);
        self.save(&data).await
    }

    async fn remove(&self, keys: &[&str]) -> StyleResult<()> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;
        for key in keys {
            data.remove(*key);
        }
        self.save(&data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_and_reads_json() {
        let dir = tempdir().expect("tempdir");
        let store = FileKvStore::new(dir.path().join("nested").join("settings.json"));
        let mut entries = Map::new();
        entries.insert("apiKey_google".to_string(), json!("secret"));
        store.set(entries).await.expect("set");

        let reopened = FileKvStore::new(store.path().to_path_buf());
        let loaded = reopened.get(&["apiKey_google"]).await.expect("get");
        assert_eq!(loaded.get("apiKey_google"), Some(&json!("secret")));
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempdir().expect("tempdir");
        let store = FileKvStore::new(dir.path().join("absent.json"));
        assert!(store.get(&["apiUrl"]).await.expect("get").is_empty());
    }

    #[tokio::test]
    async fn non_object_file_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2, 3]").expect("write");
        let store = FileKvStore::new(path);
        let error = store.get(&["apiUrl"]).await.expect_err("array root");
        assert!(matches!(error, StyleError::Storage(_)));
    }

    #[tokio::test]
    async fn remove_persists() {
        let dir = tempdir().expect("tempdir");
        let store = FileKvStore::new(dir.path().join("settings.json"));
        let mut entries = Map::new();
        entries.insert("a".to_string(), json!(1));
        entries.insert("b".to_string(), json!(2));
        store.set(entries).await.expect("set");
        store.remove(&["a"]).await.expect("remove");

        let loaded = store.get(&["a", "b"]).await.expect("get");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("b"), Some(&json!(2)));
    }
}
