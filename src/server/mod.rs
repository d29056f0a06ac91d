//! JSON API server

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::ContentReader;
use crate::store::{CommentError, CounterStore, NewComment, Stores};
use crate::Blog;

/// Server state
pub struct AppState {
    pub reader: ContentReader,
    pub stores: Stores,
}

impl AppState {
    pub fn from_blog(blog: &Blog) -> Result<Self> {
        Ok(Self {
            reader: blog.reader(),
            stores: blog.stores()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
struct CountBody {
    count: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/blog", get(article_handler))
        .route("/api/blog/list", get(list_handler))
        .route("/api/blog/search", get(search_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/tags", get(tags_handler))
        .route("/api/comments", get(comments_handler).post(add_comment_handler))
        .route("/api/comments/threads", get(threads_handler))
        .route("/api/likes", get(like_count_handler).post(like_handler))
        .route("/api/reads", get(read_count_handler).post(read_handler))
        .route("/api/stats/likes", get(all_likes_handler))
        .route("/api/stats/reads", get(all_reads_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_blog(blog)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Serving articles from {:?}", blog.content_dir);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run a directory scan off the async workers
async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("Content task failed: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "content task failed")
    })
}

pub async fn list_handler(State(state): State<Arc<AppState>>) -> Response {
    let reader = state.reader.clone();
    match blocking(move || reader.list_articles()).await {
        Ok(Ok(articles)) => Json(articles).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to list articles: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(response) => response,
    }
}

pub async fn article_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    let reader = state.reader.clone();
    match blocking(move || reader.get_article(&query.name)).await {
        Ok(article) => Json(article).into_response(),
        Err(response) => response,
    }
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let reader = state.reader.clone();
    match blocking(move || reader.search_articles(&query.q)).await {
        Ok(articles) => Json(articles).into_response(),
        Err(response) => response,
    }
}

pub async fn categories_handler(State(state): State<Arc<AppState>>) -> Response {
    let reader = state.reader.clone();
    match blocking(move || reader.categories_with_articles()).await {
        Ok(groups) => Json(groups).into_response(),
        Err(response) => response,
    }
}

pub async fn tags_handler(State(state): State<Arc<AppState>>) -> Response {
    let reader = state.reader.clone();
    match blocking(move || reader.tags_with_articles()).await {
        Ok(groups) => Json(groups).into_response(),
        Err(response) => response,
    }
}

pub async fn comments_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    let comments = state.stores.comments.comments_by_blog_name(&query.name).await;
    Json(comments).into_response()
}

pub async fn threads_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThreadQuery>,
) -> Response {
    let page = state.stores.comments.threads(&query.name, query.page).await;
    Json(page).into_response()
}

pub async fn add_comment_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewComment>,
) -> Response {
    match state.stores.comments.add_comment(input).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e @ CommentError::Invalid(_)) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Err(e @ CommentError::Save(_)) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn count(store: &CounterStore, name: &str) -> Response {
    Json(CountBody {
        count: store.count(name).await,
    })
    .into_response()
}

async fn increment(store: &CounterStore, name: &str) -> Response {
    if name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "name is required");
    }
    Json(CountBody {
        count: store.increment(name).await,
    })
    .into_response()
}

pub async fn like_count_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    count(&state.stores.likes, &query.name).await
}

pub async fn like_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    increment(&state.stores.likes, &query.name).await
}

pub async fn read_count_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    count(&state.stores.reads, &query.name).await
}

pub async fn read_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Response {
    increment(&state.stores.reads, &query.name).await
}

pub async fn all_likes_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stores.likes.all().await).into_response()
}

pub async fn all_reads_handler(State(state): State<Arc<AppState>>) -> Response {
    Json(state.stores.reads.all().await).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use serde_json::Value;
    use tempfile::TempDir;

    fn state(tmp: &TempDir) -> Arc<AppState> {
        let blog = Blog::with_config(tmp.path(), SiteConfig::default());
        std::fs::create_dir_all(&blog.content_dir).unwrap();
        std::fs::write(
            blog.content_dir.join("[Hello]-[2024-01-02].md"),
            "categories: [rust]\n# Hello",
        )
        .unwrap();
        std::fs::write(blog.content_dir.join("[about]-[2020-01-01].md"), "me").unwrap();
        Arc::new(AppState::from_blog(&blog).unwrap())
    }

    async fn body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn name(name: &str) -> Query<NameQuery> {
        Query(NameQuery {
            name: name.to_string(),
        })
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);

        let response = list_handler(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let list = body(response).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["name"], "Hello");

        let article = body(article_handler(State(state.clone()), name("about")).await).await;
        assert_eq!(article["content"], "me");

        let missing = body(article_handler(State(state), name("nope")).await).await;
        assert!(missing.is_null());
    }

    #[tokio::test]
    async fn test_list_error_status() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);
        std::fs::write(state.reader.content_dir().join("broken.md"), "").unwrap();

        let response = list_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_add_comment_validation_status() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);

        let input = NewComment {
            blog_name: "Hello".to_string(),
            nickname: "alice".to_string(),
            content: "x".repeat(101),
            parent_id: None,
        };
        let response = add_comment_handler(State(state.clone()), Json(input)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(response).await["error"],
            "comment must not exceed 100 characters"
        );

        let input = NewComment {
            blog_name: "Hello".to_string(),
            nickname: "alice".to_string(),
            content: "hi".to_string(),
            parent_id: None,
        };
        let response = add_comment_handler(State(state.clone()), Json(input)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let comments = body(comments_handler(State(state), name("Hello")).await).await;
        assert_eq!(comments[0]["nickname"], "alice");
    }

    #[tokio::test]
    async fn test_counters() {
        let tmp = TempDir::new().unwrap();
        let state = state(&tmp);

        body(like_handler(State(state.clone()), name("Hello")).await).await;
        let liked = body(like_handler(State(state.clone()), name("Hello")).await).await;
        assert_eq!(liked["count"], 2);

        let reads = body(read_count_handler(State(state.clone()), name("Hello")).await).await;
        assert_eq!(reads["count"], 0);

        let all = body(all_likes_handler(State(state.clone())).await).await;
        assert_eq!(all["Hello"], 2);

        let response = like_handler(State(state), name("")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
