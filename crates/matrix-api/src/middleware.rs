use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};

use matrix_types::api::Claims;

use crate::AppState;
use crate::error::ApiError;

/// The user a request was authenticated as. Inserted as a request extension
/// by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

/// Validate the bearer token and confirm its user still exists.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::NotAuthenticated)?;

    let claims = decode_token(&state.jwt_secret, bearer.token())?;

    let user_id = claims.sub.to_string();
    let user = crate::with_db(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or(ApiError::Unauthorized("User not found"))?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::Unauthorized("Token has expired"),
        _ => ApiError::Unauthorized("Invalid token"),
    })
}
