//! JSON file persistence for the served dictionary.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::RwLock;

use crate::dictionary::StyleDictionary;
use crate::error::{StyleError, StyleResult};

pub struct ArtistStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl ArtistStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: RwLock::new(()),
        }
    }

    /// Opens the store, copying `seed` into place first when the data file
    /// does not exist yet. A failed copy is logged and the store starts empty.
    pub async fn open(path: PathBuf, seed: Option<&Path>) -> StyleResult<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| storage_error("create data directory", parent, error))?;
        }
        if let Some(seed) = seed {
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                match tokio::fs::copy(seed, &path).await {
                    Ok(_) => tracing::info!("seeded {} from {}", path.display(), seed.display()),
                    Err(error) => tracing::warn!("failed to seed {}: {error}", path.display()),
                }
            }
        }
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current dictionary; a missing or unreadable file reads as the empty
    /// enabled default.
    pub async fn read(&self) -> StyleDictionary {
        let _guard = self.lock.read().await;
        match self.load().await {
            Ok(dictionary) => dictionary,
            Err(error) => {
                tracing::warn!("error reading artists file: {error}");
                StyleDictionary::default()
            }
        }
    }

    /// Read-modify-write under the write lock. Nothing is written when
    /// `change` fails.
    pub async fn update<T, F>(&self, change: F) -> StyleResult<T>
    where
        F: FnOnce(&mut StyleDictionary) -> StyleResult<T>,
    {
        let _guard = self.lock.write().await;
        let mut dictionary = self.load().await.unwrap_or_else(|error| {
            tracing::warn!("error reading artists file: {error}");
            StyleDictionary::default()
        });
        let value = change(&mut dictionary)?;
        self.save(&dictionary).await?;
        Ok(value)
    }

    /// Writes a copy to `dir/artist_styles_<timestamp>.json`.
    pub async fn backup(&self, dir: &Path, now: DateTime<Utc>) -> StyleResult<(PathBuf, usize)> {
        let _guard = self.lock.read().await;
        let dictionary = self.load().await?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|error| storage_error("create backup directory", dir, error))?;
        let stamp = now
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");
        let target = dir.join(format!("artist_styles_{stamp}.json"));
        write_pretty(&target, &dictionary).await?;
        Ok((target, dictionary.len()))
    }

    async fn load(&self) -> StyleResult<StyleDictionary> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|error| storage_error("read", &self.path, error))?;
        serde_json::from_slice(&bytes)
            .map_err(|error| StyleError::Storage(format!("artists file parse error: {error}")))
    }

    async fn save(&self, dictionary: &StyleDictionary) -> StyleResult<()> {
        write_pretty(&self.path, dictionary).await
    }
}

async fn write_pretty(path: &Path, dictionary: &StyleDictionary) -> StyleResult<()> {
    let serialized = serde_json::to_vec_pretty(dictionary)
        .map_err(|error| StyleError::Storage(format!("artists serialize error: {error}")))?;
    tokio::fs::write(path, serialized)
        .await
        .map_err(|error| storage_error("write", path, error))
}

fn storage_error(action: &str, path: &Path, error: std::io::Error) -> StyleError {
    StyleError::Storage(format!("failed to {action} {}: {error}", path.display()))
}
