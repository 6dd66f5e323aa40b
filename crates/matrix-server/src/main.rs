use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::{info, warn};

use matrix_api::AppStateInner;

const DEFAULT_JWT_SECRET: &str = "matrix-secret-key-change-in-production";

/// Placeholder secrets that only belong in development.
const PLACEHOLDER_SECRETS: &[&str] = &[DEFAULT_JWT_SECRET, "change-me-to-a-random-string"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "matrix=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("MATRIX_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.into());
    if PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        warn!("MATRIX_JWT_SECRET is unset or a placeholder; tokens are forgeable");
    }
    let db_path = std::env::var("MATRIX_DB_PATH").unwrap_or_else(|_| "matrix.db".into());
    let host = std::env::var("MATRIX_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MATRIX_PORT")
        .unwrap_or_else(|_| "8001".into())
        .parse()?;

    let db = matrix_db::Database::open(&PathBuf::from(&db_path))?;
    let app = matrix_api::router(AppStateInner::new(db, jwt_secret));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Matrix wall server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Matrix wall server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
