//! In-memory blog collection for tests.
//!
//! Records every call and can be told to fail the next one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;

use crate::api::{ApiError, ApiResult, BlogApi};
use crate::models::{Comment, CommentInput, Post, PostInput};

#[derive(Debug, Clone, Default)]
pub struct FakeBlogApi {
    inner: Arc<Mutex<FakeInner>>,
}

#[derive(Debug, Default)]
struct FakeInner {
    posts: Vec<Post>,
    calls: Vec<String>,
    failures: VecDeque<String>,
    next_id: u64,
}

impl FakeInner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn timestamp(&self) -> String {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (base + Duration::minutes(self.next_id as i64)).to_rfc3339()
    }

    fn record(&mut self, call: String) -> ApiResult<()> {
        self.calls.push(call);
        match self.failures.pop_front() {
            Some(message) => Err(ApiError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message,
            }),
            None => Ok(()),
        }
    }

    fn find(&mut self, id: &str) -> ApiResult<&mut Post> {
        self.posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| ApiError::Server {
                status: StatusCode::NOT_FOUND,
                message: "Blog not found".into(),
            })
    }
}

impl FakeBlogApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn fail_next(&self, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .push_back(message.to_string());
    }

    pub fn posts(&self) -> Vec<Post> {
        self.inner.lock().unwrap().posts.clone()
    }
}

impl BlogApi for FakeBlogApi {
    fn list_posts(&self) -> ApiResult<Vec<Post>> {
        let mut inner = self.inner.lock().unwrap();
        inner.record("list".into())?;
        Ok(inner
            .posts
            .iter()
            .cloned()
            .map(|mut post| {
                post.comments.clear();
                post
            })
            .collect())
    }

    fn get_post(&self, id: &str) -> ApiResult<Post> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("get {id}"))?;
        inner.find(id).map(|post| post.clone())
    }

    fn create_post(&self, input: &PostInput) -> ApiResult<Post> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("create {}", input.title))?;
        let id = inner.next_id("post-");
        let post = Post {
            id,
            title: input.title.clone(),
            content: input.content.clone(),
            name: input.name.clone(),
            email: input.email.clone(),
            created_at: Some(inner.timestamp()),
            ..Post::default()
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    fn update_post(&self, id: &str, input: &PostInput) -> ApiResult<Post> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("update {id}"))?;
        let post = inner.find(id)?;
        post.title = input.title.clone();
        post.content = input.content.clone();
        post.name = input.name.clone();
        post.email = input.email.clone();
        Ok(post.clone())
    }

    fn delete_post(&self, id: &str) -> ApiResult<serde_json::Value> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("delete {id}"))?;
        inner.find(id)?;
        inner.posts.retain(|post| post.id != id);
        Ok(serde_json::json!({ "message": "Blog deleted" }))
    }

    fn add_comment(&self, id: &str, input: &CommentInput) -> ApiResult<Post> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(format!("comment {id}"))?;
        let comment_id = inner.next_id("comment-");
        let created_at = inner.timestamp();
        let post = inner.find(id)?;
        post.comments.push(Comment {
            id: comment_id,
            post_id: Some(id.to_string()),
            name: input.name.clone(),
            email: input.email.clone(),
            content: input.content.clone(),
            created_at: Some(created_at),
        });
        Ok(post.clone())
    }

    fn tenant(&self) -> &str {
        "test-tenant"
    }
}
