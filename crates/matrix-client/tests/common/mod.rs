#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;
use uuid::Uuid;

use matrix_client::toast::{self, Toast, ToastFeed, Toaster};
use matrix_client::{ApiError, Session, SessionContext, WallApi};
use matrix_types::api::{CreatePostRequest, LoginRequest, RegisterRequest, TokenResponse, TokenUser};
use matrix_types::models::{Post, User};

/// Every request the screens made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Register(String),
    WallPosts(String),
    CreatePost {
        token: String,
        wall_owner: String,
        content: String,
    },
    Users,
}

/// Scripted outcome for an endpoint.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Fail(StatusCode, Option<String>),
    Hang,
}

impl<T: Clone> Reply<T> {
    fn resolve(&self) -> Option<Result<T, ApiError>> {
        match self {
            Self::Ok(value) => Some(Ok(value.clone())),
            Self::Fail(status, detail) => Some(Err(ApiError::Server {
                status: *status,
                detail: detail.clone(),
            })),
            Self::Hang => None,
        }
    }
}

pub struct FakeState {
    pub auth: Reply<TokenResponse>,
    pub posts: Reply<Vec<Post>>,
    pub create: Reply<Post>,
    pub users: Reply<Vec<User>>,
    pub calls: Vec<Call>,
}

/// In-memory stand-in for the wall server.
#[derive(Clone)]
pub struct FakeApi {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                auth: Reply::Fail(StatusCode::UNAUTHORIZED, None),
                posts: Reply::Ok(Vec::new()),
                create: Reply::Ok(post("neo", "neo", "created", 0)),
                users: Reply::Ok(Vec::new()),
                calls: Vec::new(),
            })),
        }
    }

    pub fn set<F: FnOnce(&mut FakeState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record<T: Clone>(&self, call: Call, pick: impl Fn(&FakeState) -> &Reply<T>) -> Option<Result<T, ApiError>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        pick(&state).resolve()
    }
}

async fn settle<T>(outcome: Option<Result<T, ApiError>>) -> Result<T, ApiError> {
    match outcome {
        Some(result) => result,
        None => std::future::pending().await,
    }
}

impl WallApi for FakeApi {
    async fn login(&self, req: &LoginRequest) -> Result<TokenResponse, ApiError> {
        let outcome = self.record(Call::Login(req.username.clone()), |s| &s.auth);
        settle(outcome).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<TokenResponse, ApiError> {
        let outcome = self.record(Call::Register(req.username.clone()), |s| &s.auth);
        settle(outcome).await
    }

    async fn wall_posts(&self, username: &str) -> Result<Vec<Post>, ApiError> {
        let outcome = self.record(Call::WallPosts(username.to_string()), |s| &s.posts);
        settle(outcome).await
    }

    async fn create_post(&self, token: &str, req: &CreatePostRequest) -> Result<Post, ApiError> {
        let call = Call::CreatePost {
            token: token.to_string(),
            wall_owner: req.wall_owner.clone(),
            content: req.content.clone(),
        };
        let outcome = self.record(call, |s| &s.create);
        settle(outcome).await
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        let outcome = self.record(Call::Users, |s| &s.users);
        settle(outcome).await
    }
}

pub fn token_for(username: &str, token: &str) -> TokenResponse {
    TokenResponse {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
        user: TokenUser {
            id: None,
            username: username.to_string(),
            created_at: None,
        },
    }
}

/// `minutes` after a fixed instant, so ordering in fixtures is explicit.
pub fn post(wall_owner: &str, author: &str, content: &str, minutes: i64) -> Post {
    Post {
        id: Uuid::new_v4(),
        wall_owner: wall_owner.to_string(),
        author: author.to_string(),
        content: content.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
    }
}

pub fn user(username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        created_at: Utc::now(),
    }
}

pub fn signed_in(username: &str) -> SessionContext {
    SessionContext::in_memory(Some(Session {
        token: format!("token-{}", username),
        username: username.to_string(),
    }))
}

pub fn toasts() -> (Toaster, ToastFeed) {
    toast::channel()
}

pub fn messages(feed: &mut ToastFeed) -> Vec<String> {
    feed.drain().into_iter().map(|t: Toast| t.message).collect()
}
