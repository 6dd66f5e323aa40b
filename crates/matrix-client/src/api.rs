//! HTTP access to the wall server.
//!
//! Screens talk to the server through [`WallApi`] so they can be driven by
//! [`ApiClient`] in production and by an in-memory double in tests.

use std::future::Future;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use matrix_types::api::{CreatePostRequest, ErrorBody, LoginRequest, RegisterRequest, TokenResponse};
use matrix_types::models::{Post, User};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server returned {status}")]
    Server {
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),
}

impl ApiError {
    /// The server's `detail` message, when it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// What to show the user: the server's detail verbatim, else `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.detail().unwrap_or(fallback)
    }
}

/// The REST surface the screens depend on. One call is one round trip.
pub trait WallApi {
    fn login(
        &self,
        req: &LoginRequest,
    ) -> impl Future<Output = Result<TokenResponse, ApiError>> + Send;

    fn register(
        &self,
        req: &RegisterRequest,
    ) -> impl Future<Output = Result<TokenResponse, ApiError>> + Send;

    fn wall_posts(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<Post>, ApiError>> + Send;

    fn create_post(
        &self,
        token: &str,
        req: &CreatePostRequest,
    ) -> impl Future<Output = Result<Post, ApiError>> + Send;

    fn users(&self) -> impl Future<Output = Result<Vec<User>, ApiError>> + Send;
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// `api_url` is the server root; requests go to `{api_url}/api/...`.
    pub fn new(api_url: &str) -> Result<Self, ApiError> {
        let mut base =
            Url::parse(api_url).map_err(|_| ApiError::InvalidUrl(api_url.to_string()))?;
        base.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(api_url.to_string()))?
            .pop_if_empty()
            .push("api");

        let http = Client::builder().build().map_err(ApiError::Transport)?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .extend(segments);
        Ok(url)
    }
}

impl WallApi for ApiClient {
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ApiError> {
        let url = self.endpoint(&["login"])?;
        debug!("POST {}", url);
        let resp = self.http.post(url).json(req).send().await.map_err(ApiError::Transport)?;
        decode(resp).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse, ApiError> {
        let url = self.endpoint(&["register"])?;
        debug!("POST {}", url);
        let resp = self.http.post(url).json(req).send().await.map_err(ApiError::Transport)?;
        decode(resp).await
    }

    async fn wall_posts(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        let url = self.endpoint(&["posts", username])?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(ApiError::Transport)?;
        decode(resp).await
    }

    async fn create_post(&self, token: &str, req: &CreatePostRequest) -> Result<Post, ApiError> {
        let url = self.endpoint(&["posts"])?;
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(req)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        decode(resp).await
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        let url = self.endpoint(&["users"])?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(ApiError::Transport)?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(ApiError::Decode);
    }

    // Non-2xx bodies should be `{ "detail": "..." }`; anything else has no detail.
    let body = resp.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body).ok().map(|b| b.detail);
    debug!("Server returned {} ({:?})", status, detail);
    Err(ApiError::Server { status, detail })
}
