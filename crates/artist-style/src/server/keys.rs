//! Per-vendor API key files.

use std::path::{Path, PathBuf};

use crate::error::{StyleError, StyleResult};
use crate::provider::ProviderKind;

/// One `<vendor>_api_key.txt` file per provider vendor.
pub struct ApiKeyStore {
    dir: PathBuf,
}

impl ApiKeyStore {
    pub async fn open(dir: PathBuf) -> StyleResult<Self> {
        tokio::fs::create_dir_all(&dir).await.map_err(|error| {
            StyleError::Storage(format!(
                "failed to create api key directory {}: {error}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    pub fn key_path(&self, kind: ProviderKind) -> PathBuf {
        self.dir.join(format!("{}_api_key.txt", kind.vendor()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stored key for `kind`, trimmed. Missing, blank or unreadable files
    /// yield `None`.
    pub async fn load(&self, kind: ProviderKind) -> Option<String> {
        let path = self.key_path(kind);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let key = contents.trim();
                if key.is_empty() {
                    None
                } else {
                    tracing::info!("API key loaded from file for {kind}");
                    Some(key.to_string())
                }
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(error) => {
                tracing::warn!("error loading API key for {kind}: {error}");
                None
            }
        }
    }

    pub async fn save(&self, kind: ProviderKind, api_key: &str) -> StyleResult<()> {
        let path = self.key_path(kind);
        tokio::fs::write(&path, api_key.trim()).await.map_err(|error| {
            StyleError::Storage(format!("failed to write {}: {error}", path.display()))
        })?;
        tracing::info!("API key saved to file for {kind}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn keys_are_stored_per_vendor() {
        let dir = tempdir().expect("tempdir");
        let keys = ApiKeyStore::open(dir.path().join("api_keys")).await.expect("open");
        assert_eq!(keys.load(ProviderKind::Gemini).await, None);

        keys.save(ProviderKind::Gemini, " g-key\n").await.expect("save");
        assert!(keys.dir().join("google_api_key.txt").exists());
        assert_eq!(keys.load(ProviderKind::Gemini).await.as_deref(), Some("g-key"));
        assert_eq!(keys.load(ProviderKind::Claude).await, None);
    }

    #[tokio::test]
    async fn blank_key_file_is_absent() {
        let dir = tempdir().expect("tempdir");
        let keys = ApiKeyStore::open(dir.path().to_path_buf()).await.expect("open");
        tokio::fs::write(keys.key_path(ProviderKind::OpenAI), "  \n")
            .await
            .expect("write");
        assert_eq!(keys.load(ProviderKind::OpenAI).await, None);
    }
}
