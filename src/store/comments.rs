//! Article comments and reply threads

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

use super::{JsonStore, StoreError};
use crate::config::CommentsConfig;
use crate::helpers::{offset_timestamp, parse_timestamp};

/// Top-level comments shown per page
pub const THREADS_PER_PAGE: usize = 8;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// A stored comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Title of the article commented on; not checked against the content
    pub blog_name: String,
    pub nickname: String,
    pub content: String,
    /// Fixed-offset local timestamp, e.g. `2024-05-01T10:00:00.000+08:00`
    pub created_at: String,
    /// Comment this one replies to; may point at nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Comment {
    /// Parent id, with an empty string meaning top-level
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }

    fn created(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.created_at)
    }
}

/// Comment document: `{ "comments": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentsDocument {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A comment submission
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub blog_name: String,
    pub nickname: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// A top-level comment with every descendant flattened into one level
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub comment: Comment,
    /// Oldest first
    pub replies: Vec<Comment>,
}

/// One page of threads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPage {
    pub threads: Vec<CommentThread>,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Error, Debug)]
pub enum CommentError {
    /// Rejected input; the message is shown to the commenter as is
    #[error("{0}")]
    Invalid(String),

    #[error("failed to save comment")]
    Save(#[source] StoreError),
}

/// Comments for every article, kept in one document
#[derive(Debug)]
pub struct CommentStore {
    store: JsonStore<CommentsDocument>,
    limits: CommentsConfig,
    tz: Tz,
}

impl CommentStore {
    pub fn new(store: JsonStore<CommentsDocument>, limits: CommentsConfig, tz: Tz) -> Self {
        Self { store, limits, tz }
    }

    /// Validate and append a comment, returning it as stored
    pub async fn add_comment(&self, input: NewComment) -> Result<Comment, CommentError> {
        self.validate(&input)?;

        let _guard = self.store.lock().await;
        let mut doc = self.store.read().await;

        let mut id = generate_id();
        while doc.comments.iter().any(|c| c.id == id) {
            id = generate_id();
        }

        let comment = Comment {
            id,
            blog_name: input.blog_name,
            nickname: input.nickname,
            content: input.content,
            created_at: offset_timestamp(&Utc::now().with_timezone(&self.tz)),
            parent_id: input.parent_id.filter(|p| !p.is_empty()),
        };

        doc.comments.push(comment.clone());
        self.store.write(&doc).await.map_err(|e| {
            tracing::error!("Failed to save comment on {:?}: {}", comment.blog_name, e);
            CommentError::Save(e)
        })?;

        tracing::info!("New comment {} on {:?}", comment.id, comment.blog_name);
        Ok(comment)
    }

    fn validate(&self, input: &NewComment) -> Result<(), CommentError> {
        if input.blog_name.is_empty() || input.nickname.is_empty() || input.content.is_empty() {
            return Err(CommentError::Invalid(
                "please fill in all comment fields".to_string(),
            ));
        }

        let max = self.limits.nickname_max_len;
        if input.nickname.chars().count() > max {
            return Err(CommentError::Invalid(format!(
                "nickname must not exceed {} characters",
                max
            )));
        }

        let max = self.limits.content_max_len;
        if input.content.chars().count() > max {
            return Err(CommentError::Invalid(format!(
                "comment must not exceed {} characters",
                max
            )));
        }

        Ok(())
    }

    /// Comments on `blog_name`, newest first
    pub async fn comments_by_blog_name(&self, blog_name: &str) -> Vec<Comment> {
        let mut comments: Vec<_> = self
            .store
            .read()
            .await
            .comments
            .into_iter()
            .filter(|c| c.blog_name == blog_name)
            .collect();

        comments.sort_by(newest_first);
        comments
    }

    /// One page of reply threads for `blog_name`; pages start at 1
    pub async fn threads(&self, blog_name: &str, page: usize) -> ThreadPage {
        let threads = build_threads(&self.comments_by_blog_name(blog_name).await);
        paginate(threads, page)
    }
}

/// `<unix millis>-<9 random base36 chars>`
fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Ascending by timestamp; unparsable timestamps go last
fn oldest_first(a: &Comment, b: &Comment) -> Ordering {
    match (a.created(), b.created()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by timestamp; unparsable timestamps go last
fn newest_first(a: &Comment, b: &Comment) -> Ordering {
    match (a.created(), b.created()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group comments under their top-level ancestor.
///
/// Top-level comments keep their input order. Comments whose parent chain
/// never reaches a top-level comment are left out.
pub fn build_threads(comments: &[Comment]) -> Vec<CommentThread> {
    comments
        .iter()
        .filter(|c| c.parent().is_none())
        .map(|top| {
            let mut seen: HashSet<&str> = HashSet::from([top.id.as_str()]);
            let mut queue: VecDeque<&str> = VecDeque::from([top.id.as_str()]);
            let mut replies = Vec::new();

            while let Some(parent) = queue.pop_front() {
                for reply in comments
                    .iter()
                    .filter(|c| c.parent() == Some(parent))
                {
                    if seen.insert(reply.id.as_str()) {
                        replies.push(reply.clone());
                        queue.push_back(reply.id.as_str());
                    }
                }
            }

            replies.sort_by(oldest_first);
            CommentThread {
                comment: top.clone(),
                replies,
            }
        })
        .collect()
}

fn paginate(threads: Vec<CommentThread>, page: usize) -> ThreadPage {
    let page = page.max(1);
    let total_pages = threads.len().div_ceil(THREADS_PER_PAGE);
    let threads = threads
        .into_iter()
        .skip((page - 1).saturating_mul(THREADS_PER_PAGE))
        .take(THREADS_PER_PAGE)
        .collect();

    ThreadPage {
        threads,
        page,
        total_pages,
    }
}
