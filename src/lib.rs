//! flatblog: a markdown-file blog backend
//!
//! Articles are read from a directory of `[title]-[date].md` files on every
//! request. Comments, like counts and read counts live in flat JSON
//! documents that are rewritten in full on each change.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::Path;

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Markdown article directory
    pub content_dir: std::path::PathBuf,
    /// Directory holding the JSON store documents
    pub data_dir: std::path::PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let data_dir = base_dir.join(&config.data_dir);

        Self {
            config,
            base_dir,
            content_dir,
            data_dir,
        }
    }

    /// Reader over the article directory
    pub fn reader(&self) -> content::ContentReader {
        content::ContentReader::from_blog(self)
    }

    /// Open the comment and counter stores
    pub fn stores(&self) -> Result<store::Stores> {
        store::Stores::from_blog(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_without_config() {
        let tmp = TempDir::new().unwrap();
        let blog = Blog::new(tmp.path()).unwrap();
        assert_eq!(blog.content_dir, tmp.path().join("content/mds"));
        assert_eq!(blog.data_dir, tmp.path().join("data"));
        assert_eq!(blog.config.blocklist, vec!["about"]);
    }

    #[test]
    fn test_config_without_blocklist_keeps_default() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("_config.yml"), "title: Mine\n").unwrap();

        let blog = Blog::new(tmp.path()).unwrap();
        assert_eq!(blog.config.title, "Mine");
        assert_eq!(blog.config.blocklist, vec!["about"]);
        assert!(blog.reader().is_blocked("about"));
    }

    #[test]
    fn test_new_with_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("_config.yml"),
            "content_dir: posts\ndata_dir: db\nblocklist: [about]\n",
        )
        .unwrap();

        let blog = Blog::new(tmp.path()).unwrap();
        assert_eq!(blog.content_dir, tmp.path().join("posts"));
        assert_eq!(blog.data_dir, tmp.path().join("db"));
        assert!(blog.reader().is_blocked("about me"));
    }
}
