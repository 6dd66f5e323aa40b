use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use matrix_types::models::User;

use crate::api::WallApi;
use crate::render;
use crate::route::Route;
use crate::screens::{Phase, Transition, scoped};
use crate::session::SessionContext;
use crate::toast::Toaster;

/// One row of the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub username: String,
    pub is_self: bool,
}

/// Every registered user, unfiltered and unpaginated.
pub struct DirectoryScreen {
    session: SessionContext,
    toaster: Toaster,
    scope: CancellationToken,
    users: Vec<User>,
    phase: Phase,
}

impl DirectoryScreen {
    pub fn new(session: SessionContext, toaster: Toaster) -> Self {
        Self {
            session,
            toaster,
            scope: CancellationToken::new(),
            users: Vec::new(),
            phase: Phase::Idle,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    pub(crate) fn set_scope(&mut self, scope: CancellationToken) {
        self.scope = scope;
    }

    pub async fn mount<A: WallApi>(&mut self, api: &A) -> Transition {
        if !self.session.is_signed_in() {
            debug!("No session, leaving /users");
            return Transition::Navigate(Route::Login);
        }
        self.load_users(api).await;
        Transition::Stay
    }

    pub async fn load_users<A: WallApi>(&mut self, api: &A) {
        let previous = self.phase;
        self.phase = Phase::Loading;

        match scoped(&self.scope, api.users()).await {
            None => self.phase = previous,
            Some(Ok(users)) => {
                debug!("Loaded {} users", users.len());
                self.users = users;
                self.phase = Phase::Ready;
            }
            Some(Err(e)) => {
                warn!("Loading users failed: {}", e);
                self.phase = Phase::Failed;
                self.toaster.error("Failed to load users");
            }
        }
    }

    /// One entry per user in server order, the viewer's own flagged.
    pub fn entries(&self) -> Vec<DirectoryEntry> {
        let me = self.session.username();
        self.users
            .iter()
            .map(|user| DirectoryEntry {
                username: user.username.clone(),
                is_self: me.as_deref() == Some(user.username.as_str()),
            })
            .collect()
    }

    /// Select by 1-based position or by username.
    pub fn select(&self, choice: &str) -> Option<Route> {
        let choice = choice.trim();
        let by_index = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.users.get(i));

        by_index
            .or_else(|| self.users.iter().find(|u| u.username == choice))
            .map(|user| Route::profile(user.username.clone()))
    }

    /// Back to the viewer's own wall.
    pub fn back(&self) -> Transition {
        match self.session.username() {
            Some(me) => Transition::Navigate(Route::profile(me)),
            None => Transition::Navigate(Route::Login),
        }
    }

    pub fn render(&self) -> String {
        let mut out = render::rule("Users in the Matrix");
        out.push_str("  actions: back, open <n|username>\n");

        if self.phase == Phase::Loading {
            out.push_str("  Loading users...\n");
            return out;
        }

        for (i, entry) in self.entries().iter().enumerate() {
            out.push_str(&format!(
                "  {}. [{}] {}{}\n",
                i + 1,
                render::initial(&entry.username),
                entry.username,
                if entry.is_self { " (You)" } else { "" }
            ));
        }
        out
    }
}
