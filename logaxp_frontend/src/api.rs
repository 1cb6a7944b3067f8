use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{normalize_base_url, FrontendConfig};
use crate::models::{CommentInput, Post, PostInput};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations offered by the remote blog collection. Every call is a single
/// attempt scoped to the client's tenant.
pub trait BlogApi: Send + Sync {
    fn list_posts(&self) -> ApiResult<Vec<Post>>;
    fn get_post(&self, id: &str) -> ApiResult<Post>;
    fn create_post(&self, input: &PostInput) -> ApiResult<Post>;
    fn update_post(&self, id: &str, input: &PostInput) -> ApiResult<Post>;
    fn delete_post(&self, id: &str) -> ApiResult<serde_json::Value>;
    /// Returns the parent post with its full comment list.
    fn add_comment(&self, id: &str, input: &CommentInput) -> ApiResult<Post>;
    fn tenant(&self) -> &str;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    tenant: String,
    client: Client,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("tenant", &self.tenant)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tenant: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        // A single attempt with no client-side deadline; the caller decides
        // whether to resubmit.
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            base_url,
            tenant: tenant.into(),
            client,
        })
    }

    pub fn from_config(config: &FrontendConfig) -> ApiResult<Self> {
        Self::new(config.api_url.clone(), config.tenant.clone())
    }

    /// `{BASE}/{segments...}?app=<tenant>`
    pub fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("app", &self.tenant);
        Ok(url)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send()?;
        decode(check_status(response)?)
    }
}

impl BlogApi for ApiClient {
    fn list_posts(&self) -> ApiResult<Vec<Post>> {
        let url = self.url(&[])?;
        self.send(self.client.get(url))
    }

    fn get_post(&self, id: &str) -> ApiResult<Post> {
        let url = self.url(&[id])?;
        self.send(self.client.get(url))
    }

    fn create_post(&self, input: &PostInput) -> ApiResult<Post> {
        let url = self.url(&[])?;
        self.send(self.client.post(url).json(input))
    }

    fn update_post(&self, id: &str, input: &PostInput) -> ApiResult<Post> {
        let url = self.url(&[id])?;
        self.send(self.client.put(url).json(input))
    }

    fn delete_post(&self, id: &str) -> ApiResult<serde_json::Value> {
        let url = self.url(&[id])?;
        let response = check_status(self.client.delete(url).send()?)?;
        let body = response.text()?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(ApiError::Decode)
    }

    fn add_comment(&self, id: &str, input: &CommentInput) -> ApiResult<Post> {
        let url = self.url(&[id, "comments"])?;
        self.send(self.client.post(url).json(input))
    }

    fn tenant(&self) -> &str {
        &self.tenant
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ApiError::Server {
        status,
        message: server_message(status, &body),
    })
}

/// The server's own explanation when it gave one, else the raw body, else the
/// status reason.
pub(crate) fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes()?;
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("https://blog.example.com/api/v1/blogs/", "myapp1").unwrap()
    }

    #[test]
    fn collection_url_carries_tenant() {
        let url = client().url(&[]).unwrap();
        assert_eq!(url.as_str(), "https://blog.example.com/api/v1/blogs?app=myapp1");
    }

    #[test]
    fn comment_url_nests_under_post() {
        let url = client().url(&["66a1", "comments"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://blog.example.com/api/v1/blogs/66a1/comments?app=myapp1"
        );
    }

    #[test]
    fn ids_are_percent_encoded() {
        let url = client().url(&["a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://blog.example.com/api/v1/blogs/a%2Fb%20c?app=myapp1"
        );
    }

    #[test]
    fn server_message_prefers_json_message() {
        let msg = server_message(StatusCode::NOT_FOUND, r#"{"message":"Blog not found"}"#);
        assert_eq!(msg, "Blog not found");
        let msg = server_message(StatusCode::BAD_REQUEST, r#"{"error":"app is required"}"#);
        assert_eq!(msg, "app is required");
    }

    #[test]
    fn server_message_falls_back_to_body_then_reason() {
        assert_eq!(
            server_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            server_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }
}
