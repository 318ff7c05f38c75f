//! Remote dictionary source.

use std::time::Duration;

use async_trait::async_trait;

use crate::dictionary::StyleDictionary;
use crate::error::{StyleError, StyleResult};

pub const DEFAULT_API_URL: &str = "https://suno.up.railway.app";
const ARTISTS_ENDPOINT: &str = "/api/artists";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[async_trait]
pub trait DictionaryFetcher: Send + Sync {
    async fn fetch_dictionary(&self, base_url: &str) -> StyleResult<StyleDictionary>;
}

/// Fetches `GET {base_url}/api/artists` from the proxy.
#[derive(Clone)]
pub struct HttpDictionaryFetcher {
    client: reqwest::Client,
}

impl HttpDictionaryFetcher {
    pub fn new() -> StyleResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> StyleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StyleError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DictionaryFetcher for HttpDictionaryFetcher {
    async fn fetch_dictionary(&self, base_url: &str) -> StyleResult<StyleDictionary> {
        let url = artists_url(base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StyleError::FetchFailed(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StyleError::FetchFailed(format!(
                "HTTP error! status: {}",
                response.status().as_u16()
            )));
        }

        let dictionary: StyleDictionary = response
            .json()
            .await
            .map_err(|e| StyleError::FetchFailed(format!("invalid dictionary payload: {e}")))?;
        tracing::info!("artists data loaded: {} artists", dictionary.len());
        Ok(dictionary)
    }
}

pub(crate) fn artists_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), ARTISTS_ENDPOINT)
}
