//! Drives the real HTTP client and sync layer against an in-process blog API.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use logaxp_frontend::api::{ApiClient, ApiError, BlogApi};
use logaxp_frontend::cache::QueryKey;
use logaxp_frontend::comments::CommentThread;
use logaxp_frontend::models::{CommentInput, PostInput};
use logaxp_frontend::sync::{BlogSync, MutationOutput, SyncEvent};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};

const WAIT: Duration = Duration::from_secs(10);

#[derive(Clone, Default)]
struct BlogStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    posts: Vec<Value>,
    next_id: u64,
}

impl StoreInner {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", self.next_id)
    }
}

#[derive(Deserialize)]
struct TenantQuery {
    app: Option<String>,
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn tenant(query: &TenantQuery) -> Result<String, Response> {
    query
        .app
        .clone()
        .filter(|app| !app.is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "app query parameter is required"))
}

fn belongs(post: &Value, id: &str, app: &str) -> bool {
    post["_id"] == id && post["app"] == app
}

async fn list_posts(State(store): State<BlogStore>, Query(query): Query<TenantQuery>) -> Response {
    let app = match tenant(&query) {
        Ok(app) => app,
        Err(resp) => return resp,
    };
    let inner = store.inner.lock().unwrap();
    let posts: Vec<Value> = inner
        .posts
        .iter()
        .filter(|post| post["app"] == app.as_str())
        .cloned()
        .collect();
    Json(posts).into_response()
}

async fn create_post(
    State(store): State<BlogStore>,
    Query(query): Query<TenantQuery>,
    Json(body): Json<Value>,
) -> Response {
    let app = match tenant(&query) {
        Ok(app) => app,
        Err(resp) => return resp,
    };
    let mut inner = store.inner.lock().unwrap();
    let id = inner.next_id();
    let post = json!({
        "_id": id,
        "title": body["title"],
        "content": body["content"],
        "name": body["name"],
        "email": body["email"],
        "app": app,
        "createdAt": format!("2024-05-01T10:{:02}:00.000Z", inner.next_id),
        "comments": [],
    });
    inner.posts.push(post.clone());
    (StatusCode::CREATED, Json(post)).into_response()
}

async fn get_post(
    State(store): State<BlogStore>,
    Path(id): Path<String>,
    Query(query): Query<TenantQuery>,
) -> Response {
    let app = match tenant(&query) {
        Ok(app) => app,
        Err(resp) => return resp,
    };
    let inner = store.inner.lock().unwrap();
    match inner.posts.iter().find(|post| belongs(post, &id, &app)) {
        Some(post) => Json(post.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Blog not found"),
    }
}

async fn update_post(
    State(store): State<BlogStore>,
    Path(id): Path<String>,
    Query(query): Query<TenantQuery>,
    Json(body): Json<Value>,
) -> Response {
    let app = match tenant(&query) {
        Ok(app) => app,
        Err(resp) => return resp,
    };
    let mut inner = store.inner.lock().unwrap();
    match inner.posts.iter_mut().find(|post| belongs(post, &id, &app)) {
        Some(post) => {
            for field in ["title", "content", "name", "email"] {
                post[field] = body[field].clone();
            }
            Json(post.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Blog not found"),
    }
}

async fn delete_post(
    State(store): State<BlogStore>,
    Path(id): Path<String>,
    Query(query): Query<TenantQuery>,
) -> Response {
    let app = match tenant(&query) {
        Ok(app) => app,
        Err(resp) => return resp,
    };
    let mut inner = store.inner.lock().unwrap();
    let before = inner.posts.len();
    inner.posts.retain(|post| !belongs(post, &id, &app));
    if inner.posts.len() == before {
        return error(StatusCode::NOT_FOUND, "Blog not found");
    }
    Json(json!({ "message": "Blog deleted successfully" })).into_response()
}

async fn add_comment(
    State(store): State<BlogStore>,
    Path(id): Path<String>,
    Query(query): Query<TenantQuery>,
    Json(body): Json<Value>,
) -> Response {
    let app = match tenant(&query) {
        Ok(app) => app,
        Err(resp) => return resp,
    };
    let mut inner = store.inner.lock().unwrap();
    let comment_id = inner.next_id();
    match inner.posts.iter_mut().find(|post| belongs(post, &id, &app)) {
        Some(post) => {
            let comment = json!({
                "_id": comment_id,
                "blog": id,
                "name": body["name"],
                "email": body["email"],
                "content": body["content"],
            });
            if let Some(comments) = post["comments"].as_array_mut() {
                // This server lists newest comments first.
                comments.insert(0, comment);
            }
            Json(post.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Blog not found"),
    }
}

fn router(store: BlogStore) -> Router {
    Router::new()
        .route("/api/v1/blogs", get(list_posts).post(create_post))
        .route(
            "/api/v1/blogs/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/v1/blogs/:id/comments", post(add_comment))
        .with_state(store)
}

/// Serves a fresh store on an ephemeral port from a background runtime and
/// returns the collection URL.
fn spawn_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("tokio runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, router(BlogStore::default()))
                .await
                .expect("serve");
        });
    });
    format!("http://{addr}/api/v1/blogs")
}

fn hello() -> PostInput {
    PostInput {
        title: "Hello".into(),
        content: "<p>World</p>".into(),
        name: "A".into(),
        email: "a@x.com".into(),
        app: "myapp1".into(),
    }
}

#[test]
fn create_list_edit_get_roundtrip() {
    let client = ApiClient::new(spawn_server(), "myapp1").unwrap();

    let created = client.create_post(&hello()).unwrap();
    assert!(!created.id.is_empty());

    let listed = client.list_posts().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Hello");

    let edit = PostInput::edit_of(&created, "Hello v2", &created.content, client.tenant());
    client.update_post(&created.id, &edit).unwrap();

    let fetched = client.get_post(&created.id).unwrap();
    assert_eq!(fetched.title, "Hello v2");
    assert_eq!(fetched.content, "<p>World</p>");
    assert_eq!(fetched.name, "A");
    assert_eq!(fetched.email, "a@x.com");
}

#[test]
fn tenants_do_not_see_each_other() {
    let base = spawn_server();
    let mine = ApiClient::new(base.clone(), "myapp1").unwrap();
    let theirs = ApiClient::new(base, "someone-else").unwrap();

    mine.create_post(&hello()).unwrap();
    assert_eq!(mine.list_posts().unwrap().len(), 1);
    assert!(theirs.list_posts().unwrap().is_empty());
}

#[test]
fn missing_post_reports_server_message() {
    let client = ApiClient::new(spawn_server(), "myapp1").unwrap();
    match client.get_post("does-not-exist") {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            assert_eq!(message, "Blog not found");
        }
        other => panic!("expected a 404, got {other:?}"),
    }
}

#[test]
fn requests_without_tenant_are_rejected() {
    let base = spawn_server();
    let resp = reqwest::blocking::get(&base).unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[test]
fn delete_returns_confirmation() {
    let client = ApiClient::new(spawn_server(), "myapp1").unwrap();
    let created = client.create_post(&hello()).unwrap();
    let body = client.delete_post(&created.id).unwrap();
    assert_eq!(body["message"], "Blog deleted successfully");
    assert!(client.list_posts().unwrap().is_empty());
}

#[test]
fn new_comment_found_even_when_server_prepends() {
    let client = ApiClient::new(spawn_server(), "myapp1").unwrap();
    let created = client.create_post(&hello()).unwrap();
    client
        .add_comment(&created.id, &CommentInput::anonymous("first"))
        .unwrap();

    let before = client.get_post(&created.id).unwrap();
    let mut thread = CommentThread::from_post(&before);
    let second = CommentInput::anonymous("second");
    let after = client.add_comment(&created.id, &second).unwrap();

    assert_eq!(thread.absorb_created(&after.comments, &second), 1);
    let contents: Vec<&str> = thread.visible().iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);
}

#[test]
fn sync_layer_refetches_after_mutations() {
    let client = ApiClient::new(spawn_server(), "myapp1").unwrap();
    let mut sync = BlogSync::new(Arc::new(client));

    assert!(sync.posts().is_loading);
    sync.poll_blocking(WAIT);
    assert_eq!(sync.posts().data.map(Vec::len), Some(0));

    sync.create_post(hello());
    let id = match sync.poll_blocking(WAIT).pop() {
        Some(SyncEvent::MutationSucceeded(MutationOutput::Created(post))) => post.id,
        other => panic!("unexpected event: {other:?}"),
    };
    assert!(sync.store().needs_fetch(&QueryKey::Posts));
    sync.posts();
    sync.poll_blocking(WAIT);
    let titles: Vec<String> = sync
        .posts()
        .data
        .map(|posts| posts.iter().map(|p| p.title.clone()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Hello".to_string()]);

    sync.delete_post(id.clone());
    sync.poll_blocking(WAIT);
    sync.posts();
    sync.poll_blocking(WAIT);
    let remaining = sync.posts().data.cloned().unwrap_or_default();
    assert!(remaining.iter().all(|post| post.id != id));
}
