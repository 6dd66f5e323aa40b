//! Client for the Matrix wall board: sign in, read and write walls, browse
//! the user directory. All state lives on the server except the session.

pub mod api;
pub mod command;
pub mod config;
pub mod render;
pub mod route;
pub mod screens;
pub mod session;
pub mod shell;
pub mod toast;

pub use api::{ApiClient, ApiError, WallApi};
pub use config::ClientConfig;
pub use route::Route;
pub use session::{Session, SessionContext, SessionStore};
pub use shell::{Screen, Shell};
