//! Storage backends for whole JSON documents

use async_trait::async_trait;
use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use tokio::fs;

use super::StoreError;
use crate::config::BlobConfig;

/// Environment variable holding the blob store write token
pub const BLOB_TOKEN_ENV: &str = "BLOB_READ_WRITE_TOKEN";

/// Somewhere a named document can be loaded from and saved to in one piece
#[async_trait]
pub trait DocumentBackend: Send + Sync + std::fmt::Debug {
    /// Load the raw document, `None` if it does not exist
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the document with `body`
    async fn save(&self, key: &str, body: String) -> Result<(), StoreError>;
}

/// Documents stored as files in a local directory
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentBackend for LocalBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.root.join(key)).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, body: String) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;

        // Write beside the target, then swap it in with a single rename
        let path = self.root.join(key);
        let tmp = self.root.join(format!(".{}.tmp", key));
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Documents stored as objects in a network blob store
#[derive(Debug, Clone)]
pub struct BlobBackend {
    client: reqwest::Client,
    public_url: String,
    api_url: String,
    token: Option<String>,
}

impl BlobBackend {
    pub fn new(config: &BlobConfig, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create a backend using the token from the environment
    pub fn from_env(config: &BlobConfig) -> Self {
        let token = std::env::var(BLOB_TOKEN_ENV).ok();
        if token.is_none() {
            tracing::warn!("{} is not set, blob writes will be rejected", BLOB_TOKEN_ENV);
        }
        Self::new(config, token)
    }
}

#[async_trait]
impl DocumentBackend for BlobBackend {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.public_url.is_empty() {
            return Err(StoreError::NotConfigured("read_stats.blob.public_url"));
        }

        let url = format!("{}/{}", self.public_url, key);
        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.text().await?)),
            status => Err(StoreError::Status { url, status }),
        }
    }

    async fn save(&self, key: &str, body: String) -> Result<(), StoreError> {
        let token = self
            .token
            .as_deref()
            .ok_or(StoreError::NotConfigured(BLOB_TOKEN_ENV))?;

        let url = format!("{}/{}", self.api_url, key);
        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .header("x-content-type", "application/json")
            .header("x-add-random-suffix", "0")
            .header("x-allow-overwrite", "1")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status { url, status });
        }
        Ok(())
    }
}
