use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// -- JWT Claims --

/// Bearer token claims. Issued by the auth handlers and checked by the
/// posting middleware; clients treat the token as opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by both `/login` and `/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub user: TokenUser,
}

/// The user block of a [`TokenResponse`]. Only `username` is guaranteed;
/// the remaining fields are filled in by this workspace's server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub username: String,
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<User> for TokenUser {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            username: user.username,
            created_at: Some(user.created_at),
        }
    }
}

fn bearer() -> String {
    "bearer".to_string()
}

// -- Posts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub wall_owner: String,
    pub content: String,
}

// -- Misc --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
