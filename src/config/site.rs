//! Site configuration (_config.yml)

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment flag that forces read counts onto the blob backend
pub const BLOB_STORAGE_ENV: &str = "FLATBLOG_BLOB_STORAGE";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub timezone: String,

    // Directory
    pub content_dir: String,
    pub data_dir: String,

    /// Title prefixes hidden from listings (still reachable by name)
    pub blocklist: Vec<String>,

    pub comments: CommentsConfig,
    pub server: ServerConfig,
    pub read_stats: ReadStatsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "flatblog".to_string(),
            author: "John Doe".to_string(),
            timezone: "Asia/Shanghai".to_string(),

            content_dir: "content/mds".to_string(),
            data_dir: "data".to_string(),

            blocklist: vec!["about".to_string()],

            comments: CommentsConfig::default(),
            server: ServerConfig::default(),
            read_stats: ReadStatsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse the configured IANA time zone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Apply environment overrides on top of the file configuration
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(BLOB_STORAGE_ENV) {
            if value == "true" {
                tracing::debug!("{} set, read counts use blob storage", BLOB_STORAGE_ENV);
                self.read_stats.backend = StorageKind::Blob;
            }
        }
    }
}

/// Comment validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub nickname_max_len: usize,
    pub content_max_len: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            nickname_max_len: 20,
            content_max_len: 100,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

/// Which backend holds a store document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Local,
    Blob,
}

/// Read-count storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReadStatsConfig {
    pub backend: StorageKind,
    #[serde(default)]
    pub blob: BlobConfig,
}

/// Network blob store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Public base URL objects are read from
    pub public_url: String,
    /// Upload endpoint objects are written to
    pub api_url: String,
    /// Object name of the read-count document
    pub key: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            public_url: String::new(),
            api_url: "https://blob.vercel-storage.com".to_string(),
            key: "read-stats.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content/mds");
        assert_eq!(config.comments.nickname_max_len, 20);
        assert_eq!(config.comments.content_max_len, 100);
        assert_eq!(config.read_stats.backend, StorageKind::Local);
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Shanghai);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
blocklist:
  - about
  - friends
comments:
  content_max_len: 200
read_stats:
  backend: blob
  blob:
    public_url: https://store.example.com
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.blocklist, vec!["about", "friends"]);
        assert_eq!(config.comments.content_max_len, 200);
        assert_eq!(config.comments.nickname_max_len, 20);
        assert_eq!(config.read_stats.backend, StorageKind::Blob);
        assert_eq!(config.read_stats.blob.public_url, "https://store.example.com");
        assert_eq!(config.read_stats.blob.key, "read-stats.json");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: SiteConfig = serde_yaml::from_str("title: Mine\n").unwrap();
        assert_eq!(config.title, "Mine");
        assert_eq!(config.blocklist, vec!["about"]);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.read_stats.blob.key, "read-stats.json");
    }

    #[test]
    fn test_env_flag_selects_blob_backend() {
        let mut config = SiteConfig::default();

        std::env::set_var(BLOB_STORAGE_ENV, "false");
        config.apply_env();
        assert_eq!(config.read_stats.backend, StorageKind::Local);

        std::env::set_var(BLOB_STORAGE_ENV, "true");
        config.apply_env();
        std::env::remove_var(BLOB_STORAGE_ENV);
        assert_eq!(config.read_stats.backend, StorageKind::Blob);
    }

    #[test]
    fn test_invalid_timezone() {
        let config = SiteConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(config.tz().is_err());
    }
}
