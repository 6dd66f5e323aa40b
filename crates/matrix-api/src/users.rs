use axum::{Json, extract::State};

use matrix_types::models::User;

use crate::convert::user_from_row;
use crate::error::ApiError;
use crate::{AppState, with_db};

const DIRECTORY_LIMIT: u32 = 1000;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let rows = with_db(&state, |db| db.list_users(DIRECTORY_LIMIT)).await?;
    Ok(Json(rows.into_iter().map(user_from_row).collect()))
}
