//! Flat-file stores for comments, likes and reads
//!
//! Each store is a single JSON document that is read in full, changed and
//! written back in full. Read counts can live in a network blob store
//! instead of the data directory.

mod backend;
mod comments;
mod counters;
mod json;

use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

pub use backend::{BlobBackend, DocumentBackend, LocalBackend, BLOB_TOKEN_ENV};
pub use comments::{
    build_threads, Comment, CommentError, CommentStore, CommentThread, CommentsDocument,
    NewComment, ThreadPage, THREADS_PER_PAGE,
};
pub use counters::{CounterStore, StatsDocument};
pub use json::JsonStore;

use crate::config::StorageKind;
use crate::Blog;

/// Document names inside the data directory
pub const COMMENTS_FILE: &str = "comments.json";
pub const LIKE_STATS_FILE: &str = "like-stats.json";
pub const READ_STATS_FILE: &str = "read-stats.json";

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Blob storage is not configured: {0} missing")]
    NotConfigured(&'static str),
}

/// All stores of a site, with backends chosen once at startup
#[derive(Debug)]
pub struct Stores {
    pub comments: CommentStore,
    pub likes: CounterStore,
    pub reads: CounterStore,
}

impl Stores {
    pub fn from_blog(blog: &Blog) -> Result<Self> {
        let local: Arc<dyn DocumentBackend> = Arc::new(LocalBackend::new(&blog.data_dir));

        let read_stats = &blog.config.read_stats;
        let (reads_backend, reads_key): (Arc<dyn DocumentBackend>, &str) = match read_stats.backend
        {
            StorageKind::Local => (local.clone(), READ_STATS_FILE),
            StorageKind::Blob => {
                tracing::info!("Read counts stored in blob storage");
                let blob: Arc<dyn DocumentBackend> =
                    Arc::new(BlobBackend::from_env(&read_stats.blob));
                (blob, read_stats.blob.key.as_str())
            }
        };

        Ok(Self {
            comments: CommentStore::new(
                JsonStore::new(local.clone(), COMMENTS_FILE),
                blog.config.comments.clone(),
                blog.config.tz()?,
            ),
            likes: CounterStore::new("likes", JsonStore::new(local, LIKE_STATS_FILE)),
            reads: CounterStore::new("reads", JsonStore::new(reads_backend, reads_key)),
        })
    }
}
