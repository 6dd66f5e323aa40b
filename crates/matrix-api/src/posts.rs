use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use tracing::debug;
use uuid::Uuid;

use matrix_types::api::CreatePostRequest;
use matrix_types::models::Post;

use crate::convert::post_from_row;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::{AppState, with_db};

const WALL_LIMIT: u32 = 1000;

/// Any authenticated user may post on any existing wall. The author is always
/// the token's user.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::Unprocessable(e.body_text()))?;

    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Post content cannot be empty".into()));
    }

    let wall_owner = req.wall_owner.clone();
    with_db(&state, move |db| db.get_user_by_username(&wall_owner))
        .await?
        .ok_or(ApiError::NotFound("Wall owner not found"))?;

    let post_id = Uuid::new_v4().to_string();
    let author = user.username.clone();
    let row = with_db(&state, move |db| {
        db.insert_post(&post_id, &req.wall_owner, &author, &req.content)
    })
    .await?;

    debug!("{} posted on {}'s wall", row.author, row.wall_owner);
    Ok(Json(post_from_row(row)))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let rows = with_db(&state, move |db| {
        if db.get_user_by_username(&username)?.is_none() {
            return Ok(None);
        }
        db.get_wall_posts(&username, WALL_LIMIT).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(rows.into_iter().map(post_from_row).collect()))
}
