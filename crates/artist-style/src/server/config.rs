use std::env;
use std::path::{Path, PathBuf};

use crate::error::{StyleError, StyleResult};
use crate::provider::DEFAULT_MODEL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_API_KEYS_DIR: &str = "api_keys";
pub const ARTISTS_FILE_NAME: &str = "artist_styles.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` rejects every administrative write.
    pub admin_password: Option<String>,
    pub artists_file: PathBuf,
    /// Copied to `artists_file` on start when that file is missing.
    pub seed_file: Option<PathBuf>,
    pub api_keys_dir: PathBuf,
    pub default_model: String,
}

impl ServerConfig {
    /// Local loopback config with every file under `data_dir`.
    pub fn local(data_dir: &Path) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            admin_password: None,
            artists_file: data_dir.join(ARTISTS_FILE_NAME),
            seed_file: None,
            api_keys_dir: data_dir.join(DEFAULT_API_KEYS_DIR),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    pub fn from_env() -> StyleResult<Self> {
        let host = non_empty("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| StyleError::InvalidInput(format!("invalid PORT value: {value}")))?,
            None => DEFAULT_PORT,
        };
        let data_dir = non_empty("RAILWAY_VOLUME_MOUNT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let artists_file = non_empty("ARTISTS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(ARTISTS_FILE_NAME));
        let api_keys_dir = non_empty("API_KEYS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_API_KEYS_DIR));
        let default_model = non_empty("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            host,
            port,
            admin_password: non_empty("ADMIN_PASSWORD"),
            artists_file,
            seed_file: non_empty("ARTISTS_SEED_FILE").map(PathBuf::from),
            api_keys_dir,
            default_model,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
