use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use matrix_types::api::{Claims, LoginRequest, RegisterRequest, TokenResponse};

use crate::convert::user_from_row;
use crate::error::ApiError;
use crate::{AppState, with_db};

const MAX_USERNAME_LEN: usize = 32;
const TOKEN_LIFETIME_DAYS: i64 = 7;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;

    // Validate input
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".into(),
        ));
    }
    if req.username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    // Check if username is taken
    let username = req.username.clone();
    if with_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Username already exists".into()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    let username = req.username.clone();

    // The UNIQUE constraint catches a registration racing this one.
    let row = with_db(&state, move |db| {
        db.create_user(&user_id.to_string(), &username, &password_hash)
    })
    .await?
    .ok_or_else(|| ApiError::BadRequest("Username already exists".into()))?;

    let token = create_token(&state.jwt_secret, user_id, &row.username)?;
    info!("Registered user {}", row.username);

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
        user: user_from_row(row).into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;

    let username = req.username.clone();
    let user = with_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized("Invalid username or password"))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("stored hash for '{}' is unreadable: {}", user.username, e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password"))?;

    let user = user_from_row(user);
    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
        user: user.into(),
    }))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
