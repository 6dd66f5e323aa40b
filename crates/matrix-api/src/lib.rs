pub mod auth;
pub mod convert;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{Json, Router, middleware::from_fn_with_state, routing::{get, post}};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use matrix_db::Database;
use matrix_types::api::WelcomeResponse;

use crate::error::ApiError;
use crate::middleware::require_auth;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            jwt_secret: jwt_secret.into(),
        })
    }
}

/// Full HTTP surface, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(welcome))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/posts/{username}", get(posts::list_posts))
        .route("/users", get(users::list_users));

    let protected_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Matrix".to_string(),
    })
}

/// Run a blocking DB call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed"))
        })?
        .map_err(ApiError::from)
}
