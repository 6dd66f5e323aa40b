use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use matrix_types::api::CreatePostRequest;
use matrix_types::models::Post;

use crate::api::WallApi;
use crate::render::{self, PostCard};
use crate::route::Route;
use crate::screens::{Phase, Transition, scoped};
use crate::session::SessionContext;
use crate::toast::Toaster;

/// A user's wall plus the form for posting on it.
///
/// Posts are shown exactly in server order. Any signed-in viewer may post;
/// whether they are allowed to is the server's call.
pub struct ProfileScreen {
    username: String,
    session: SessionContext,
    toaster: Toaster,
    scope: CancellationToken,
    posts: Vec<Post>,
    phase: Phase,
    loaded: bool,
    draft: String,
    posting: bool,
}

impl ProfileScreen {
    pub fn new(username: impl Into<String>, session: SessionContext, toaster: Toaster) -> Self {
        Self {
            username: username.into(),
            session,
            toaster,
            scope: CancellationToken::new(),
            posts: Vec::new(),
            phase: Phase::Idle,
            loaded: false,
            draft: String::new(),
            posting: false,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_posting(&self) -> bool {
        self.posting
    }

    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    pub(crate) fn set_scope(&mut self, scope: CancellationToken) {
        self.scope = scope;
    }

    pub fn is_own_wall(&self) -> bool {
        self.session.username().as_deref() == Some(self.username.as_str())
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Requires a session (presence only), then loads the wall.
    pub async fn mount<A: WallApi>(&mut self, api: &A) -> Transition {
        if !self.session.is_signed_in() {
            debug!("No session, leaving /profile/{}", self.username);
            return Transition::Navigate(Route::Login);
        }
        self.load_posts(api).await;
        Transition::Stay
    }

    /// Replace the list with a fresh copy from the server. On failure the
    /// previous list stays.
    pub async fn load_posts<A: WallApi>(&mut self, api: &A) {
        let previous = self.phase;
        self.phase = Phase::Loading;

        match scoped(&self.scope, api.wall_posts(&self.username)).await {
            None => self.phase = previous,
            Some(Ok(posts)) => {
                debug!("Loaded {} posts for {}", posts.len(), self.username);
                self.posts = posts;
                self.loaded = true;
                self.phase = Phase::Ready;
            }
            Some(Err(e)) => {
                warn!("Loading wall of {} failed: {}", self.username, e);
                self.phase = Phase::Failed;
                self.toaster.error("Failed to load posts");
            }
        }
    }

    /// Post the draft on this wall. Blank drafts are ignored without a
    /// request; a successful post clears the draft and reloads the wall once.
    pub async fn submit_post<A: WallApi>(&mut self, api: &A) -> Transition {
        if self.draft.trim().is_empty() {
            return Transition::Stay;
        }
        let Some(session) = self.session.current() else {
            return Transition::Navigate(Route::Login);
        };

        let req = CreatePostRequest {
            wall_owner: self.username.clone(),
            content: self.draft.clone(),
        };

        self.posting = true;
        let result = scoped(&self.scope, api.create_post(&session.token, &req)).await;
        self.posting = false;

        match result {
            None => {}
            Some(Ok(post)) => {
                debug!("Created post {} on {}'s wall", post.id, post.wall_owner);
                self.toaster.success("Post created");
                self.draft.clear();
                self.load_posts(api).await;
            }
            Some(Err(e)) => {
                self.toaster.error(e.user_message("Failed to create post"));
            }
        }
        Transition::Stay
    }

    /// Sign out. Only offered on the viewer's own wall.
    pub fn logout(&mut self) -> Transition {
        if !self.is_own_wall() {
            self.toaster.error("Logout is only available on your own wall");
            return Transition::Stay;
        }

        if let Err(e) = self.session.clear() {
            self.toaster.error(format!("Could not remove stored session: {}", e));
        }
        Transition::Navigate(Route::Login)
    }

    /// Jump to the profile of the author of the `index`-th post (1-based).
    pub fn open_author(&self, index: usize) -> Option<Route> {
        index
            .checked_sub(1)
            .and_then(|i| self.posts.get(i))
            .map(|post| Route::profile(post.author.clone()))
    }

    pub fn cards(&self) -> Vec<PostCard> {
        self.posts.iter().map(PostCard::from_post).collect()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_own_wall() { "Your Wall" } else { "User Wall" }
    }

    pub fn form_title(&self) -> String {
        if self.is_own_wall() {
            "Post a Status".to_string()
        } else {
            format!("Write on {}'s Wall", self.username)
        }
    }

    pub fn placeholder(&self) -> String {
        if self.is_own_wall() {
            "What's on your mind in the Matrix?".to_string()
        } else {
            format!("Write a message for {}...", self.username)
        }
    }

    pub fn render(&self) -> String {
        let mut out = render::rule(&format!(
            "[{}] {} ({})",
            render::initial(&self.username),
            self.username,
            self.heading()
        ));

        out.push_str("  actions: users");
        if self.is_own_wall() {
            out.push_str(", logout");
        }
        out.push('\n');

        out.push_str(&format!("\n{}\n", self.form_title()));
        let draft = if self.draft.is_empty() {
            format!("({})", self.placeholder())
        } else {
            self.draft.clone()
        };
        out.push_str(&format!("  > {}\n", draft));
        if self.posting {
            out.push_str("  Posting...\n");
        }

        out.push_str("\nWall Posts\n");
        match self.phase {
            Phase::Loading => out.push_str("  Loading posts...\n"),
            _ if !self.loaded => out.push_str("  Posts could not be loaded. Try 'refresh'.\n"),
            _ if self.posts.is_empty() => out.push_str("  No posts yet. Be the first to post!\n"),
            _ => {
                for (i, card) in self.cards().iter().enumerate() {
                    out.push_str(&card.render(i + 1));
                }
            }
        }
        out
    }
}
