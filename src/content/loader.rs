//! Content reader - derives articles from the content directory on every call

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::article::group_by_label;
use super::filename::lookup_prefix;
use super::{Article, ArticleFileName, CategoryGroup, ContentError, Markers, TagGroup};
use crate::Blog;

/// Reads articles from a flat directory of `[title]-[date].md` files
#[derive(Debug, Clone)]
pub struct ContentReader {
    content_dir: PathBuf,
    blocklist: Vec<String>,
}

impl ContentReader {
    /// Create a reader over `content_dir` hiding titles that start with any
    /// non-empty `blocklist` entry from listings
    pub fn new<P: Into<PathBuf>>(content_dir: P, blocklist: Vec<String>) -> Self {
        Self {
            content_dir: content_dir.into(),
            blocklist,
        }
    }

    /// Create a reader from the site configuration
    pub fn from_blog(blog: &Blog) -> Self {
        Self::new(&blog.content_dir, blog.config.blocklist.clone())
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// List all articles, newest first, without their bodies.
    ///
    /// An unreadable directory or file yields an empty list. A file whose
    /// name does not parse aborts the whole listing.
    pub fn list_articles(&self) -> Result<Vec<Article>, ContentError> {
        match self.load_listing() {
            Ok(articles) => Ok(articles),
            Err(ContentError::Io(e)) => {
                tracing::warn!("Failed to list articles in {:?}: {}", self.content_dir, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn load_listing(&self) -> Result<Vec<Article>, ContentError> {
        let mut articles = Vec::new();

        for file_name in self.file_names()? {
            let parsed = ArticleFileName::parse(&file_name)?;
            let body = fs::read_to_string(self.content_dir.join(&file_name))?;
            let markers = Markers::extract(&body);

            let mut article = Article::new(parsed.name, parsed.date);
            article.categories = markers.categories;
            article.tags = markers.tags;
            articles.push(article);
        }

        // Newest first; stable, so equal dates keep file-name order
        articles.sort_by(|a, b| b.date.cmp(&a.date));
        articles.retain(|article| !self.is_blocked(&article.name));

        Ok(articles)
    }

    /// Look up a single article by title, including its body
    ///
    /// Blocklisted titles are still resolvable here.
    pub fn get_article(&self, name: &str) -> Option<Article> {
        let file_names = match self.file_names() {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", self.content_dir, e);
                return None;
            }
        };

        let prefix = lookup_prefix(name);
        let file_name = file_names.into_iter().find(|f| f.starts_with(&prefix))?;

        let parsed = match ArticleFileName::parse(&file_name) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Skipping article {:?}: {}", name, e);
                return None;
            }
        };

        let body = match fs::read_to_string(self.content_dir.join(&file_name)) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read article {:?}: {}", file_name, e);
                return None;
            }
        };

        let markers = Markers::extract(&body);
        let mut article = Article::new(parsed.name, parsed.date);
        article.content = Markers::strip(&body);
        article.categories = markers.categories;
        article.tags = markers.tags;

        Some(article)
    }

    /// Case-insensitive title search; a blank query matches nothing
    pub fn search_articles(&self, query: &str) -> Vec<Article> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.listing_or_empty()
            .into_iter()
            .filter(|article| article.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Group the listing by category, largest group first
    pub fn categories_with_articles(&self) -> Vec<CategoryGroup> {
        group_by_label(&self.listing_or_empty(), |a| &a.categories)
            .into_iter()
            .map(|(category, blogs)| CategoryGroup { category, blogs })
            .collect()
    }

    /// Group the listing by tag, largest group first
    pub fn tags_with_articles(&self) -> Vec<TagGroup> {
        group_by_label(&self.listing_or_empty(), |a| &a.tags)
            .into_iter()
            .map(|(tag, blogs)| TagGroup { tag, blogs })
            .collect()
    }

    /// Whether `name` is hidden from listings
    pub fn is_blocked(&self, name: &str) -> bool {
        self.blocklist
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    }

    fn listing_or_empty(&self) -> Vec<Article> {
        self.list_articles().unwrap_or_else(|e| {
            tracing::error!("Failed to list articles: {}", e);
            Vec::new()
        })
    }

    /// Names of the regular files directly inside the content directory
    fn file_names(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.content_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        Ok(names)
    }
}
