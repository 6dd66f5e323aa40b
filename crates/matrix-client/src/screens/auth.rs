use tokio_util::sync::CancellationToken;
use tracing::info;

use matrix_types::api::{LoginRequest, RegisterRequest};

use crate::api::WallApi;
use crate::render;
use crate::route::Route;
use crate::screens::{Phase, Transition, scoped};
use crate::session::{Session, SessionContext};
use crate::toast::Toaster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Login/registration form. All credential checks happen on the server.
pub struct AuthScreen {
    session: SessionContext,
    toaster: Toaster,
    scope: CancellationToken,
    mode: AuthMode,
    username: String,
    password: String,
    phase: Phase,
}

impl AuthScreen {
    pub fn new(session: SessionContext, toaster: Toaster) -> Self {
        Self {
            session,
            toaster,
            scope: CancellationToken::new(),
            mode: AuthMode::Login,
            username: String::new(),
            password: String::new(),
            phase: Phase::Idle,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    pub(crate) fn set_scope(&mut self, scope: CancellationToken) {
        self.scope = scope;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        };
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Submit the form in the current mode. On success the returned session
    /// becomes current and the user lands on their own wall.
    pub async fn submit<A: WallApi>(&mut self, api: &A) -> Transition {
        // Both fields are required, nothing more.
        if self.username.is_empty() || self.password.is_empty() {
            self.toaster.error("Username and password are required");
            return Transition::Stay;
        }

        let previous = self.phase;
        self.phase = Phase::Loading;

        let result = match self.mode {
            AuthMode::Login => {
                let req = LoginRequest {
                    username: self.username.clone(),
                    password: self.password.clone(),
                };
                scoped(&self.scope, api.login(&req)).await
            }
            AuthMode::Register => {
                let req = RegisterRequest {
                    username: self.username.clone(),
                    password: self.password.clone(),
                };
                scoped(&self.scope, api.register(&req)).await
            }
        };

        let Some(result) = result else {
            self.phase = previous;
            return Transition::Stay;
        };

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                self.phase = Phase::Failed;
                self.toaster.error(e.user_message("Authentication failed"));
                return Transition::Stay;
            }
        };

        let username = resp.user.username;
        let session = Session {
            token: resp.access_token,
            username: username.clone(),
        };
        if let Err(e) = self.session.establish(session) {
            self.phase = Phase::Failed;
            self.toaster.error(format!("Could not save session: {}", e));
            return Transition::Stay;
        }

        self.phase = Phase::Ready;
        info!("Signed in as {}", username);
        self.toaster.success(match self.mode {
            AuthMode::Login => "Welcome back to the Matrix",
            AuthMode::Register => "Welcome to the Matrix",
        });
        Transition::Navigate(Route::profile(username))
    }

    pub fn render(&self) -> String {
        let mut out = render::rule("The Matrix");
        out.push_str(match self.mode {
            AuthMode::Login => "Enter the Matrix\n",
            AuthMode::Register => "Join the Matrix\n",
        });
        let username = match self.username.as_str() {
            "" => "(e.g. neo)",
            name => name,
        };
        let password = match self.password.chars().count() {
            0 => "(empty)".to_string(),
            n => "•".repeat(n),
        };
        out.push_str(&format!("  username: {}\n", username));
        out.push_str(&format!("  password: {}\n", password));

        let action = match (self.phase, self.mode) {
            (Phase::Loading, _) => "Loading...",
            (_, AuthMode::Login) => "Enter",
            (_, AuthMode::Register) => "Register",
        };
        out.push_str(&format!("  [submit] {}\n", action));
        out.push_str(match self.mode {
            AuthMode::Login => "  [toggle] Don't have an account? Register\n",
            AuthMode::Register => "  [toggle] Already have an account? Login\n",
        });
        out
    }
}
