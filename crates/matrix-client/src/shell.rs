//! Router and screen host.
//!
//! The shell owns the one mounted screen. Navigating cancels the old
//! screen's scope before the new screen is built, so a late response for a
//! screen the user already left is dropped.
//!
//! Every screen scope is a child of the shell's interrupt token. Cancelling
//! that token abandons whatever request is in flight, even one issued by a
//! screen mounted after the interrupt was armed.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::WallApi;
use crate::command::Command;
use crate::render;
use crate::route::Route;
use crate::screens::{AuthMode, AuthScreen, DirectoryScreen, ProfileScreen, Transition};
use crate::session::SessionContext;
use crate::toast::Toaster;

/// Redirect hops followed for one navigation. Only unauthenticated screens
/// redirect, and only to `/`, which never does.
const MAX_REDIRECTS: usize = 4;

pub enum Screen {
    Auth(AuthScreen),
    Profile(ProfileScreen),
    Directory(DirectoryScreen),
    NotFound { path: String, scope: CancellationToken },
}

impl Screen {
    pub fn scope(&self) -> &CancellationToken {
        match self {
            Self::Auth(s) => s.scope(),
            Self::Profile(s) => s.scope(),
            Self::Directory(s) => s.scope(),
            Self::NotFound { scope, .. } => scope,
        }
    }

    fn set_scope(&mut self, scope: CancellationToken) {
        match self {
            Self::Auth(s) => s.set_scope(scope),
            Self::Profile(s) => s.set_scope(scope),
            Self::Directory(s) => s.set_scope(scope),
            Self::NotFound { scope: current, .. } => *current = scope,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Auth(s) => s.render(),
            Self::Profile(s) => s.render(),
            Self::Directory(s) => s.render(),
            Self::NotFound { path, .. } => format!(
                "{}  Nothing lives at {}. Try 'go /'.\n",
                render::rule("404 - Page Not Found"),
                path
            ),
        }
    }
}

pub struct Shell<A> {
    api: A,
    session: SessionContext,
    toaster: Toaster,
    route: Route,
    screen: Screen,
    interrupt: CancellationToken,
}

impl<A: WallApi> Shell<A> {
    /// Starts on an unmounted sign-in screen; call [`Shell::navigate`] to
    /// go anywhere else.
    pub fn new(api: A, session: SessionContext, toaster: Toaster) -> Self {
        let interrupt = CancellationToken::new();
        let mut screen = Screen::Auth(AuthScreen::new(session.clone(), toaster.clone()));
        screen.set_scope(interrupt.child_token());
        Self {
            api,
            session,
            toaster,
            route: Route::Login,
            screen,
            interrupt,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Token for whatever request the mounted screen is about to make.
    /// Cancelling it abandons that request.
    pub fn active_scope(&self) -> CancellationToken {
        self.screen.scope().clone()
    }

    /// Cancelling this abandons the request in flight, whichever screen
    /// issued it. Re-armed by [`Shell::rescope`].
    pub fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    /// Re-arm after an interrupt and give the mounted screen a live scope.
    pub fn rescope(&mut self) {
        if self.interrupt.is_cancelled() {
            self.interrupt = CancellationToken::new();
        }
        if self.screen.scope().is_cancelled() {
            self.screen.set_scope(self.interrupt.child_token());
        }
    }

    /// Run `command`, abandoning its requests if `interrupted` resolves
    /// first. The shell is re-armed afterwards either way.
    pub async fn handle_interruptible<F: Future>(&mut self, command: Command, interrupted: F) {
        let interrupt = self.interrupt.clone();
        {
            let handled = self.handle(command);
            tokio::pin!(handled);
            tokio::select! {
                biased;
                _ = &mut handled => {}
                _ = interrupted => {
                    info!("Interrupted, abandoning request");
                    interrupt.cancel();
                    handled.await;
                }
            }
        }
        self.rescope();
    }

    /// Unmount the current screen, then mount `route`, following redirects.
    pub async fn navigate(&mut self, route: Route) {
        let mut next = route;
        for _ in 0..=MAX_REDIRECTS {
            self.screen.scope().cancel();
            debug!("Navigating to {}", next);

            self.route = next.clone();
            self.screen = self.build(&next);

            match self.mount().await {
                Transition::Stay => return,
                Transition::Navigate(redirect) => next = redirect,
            }
        }
        debug!("Too many redirects, settling on {}", self.route);
    }

    fn build(&self, route: &Route) -> Screen {
        let session = self.session.clone();
        let toaster = self.toaster.clone();
        let mut screen = match route {
            Route::Login => Screen::Auth(AuthScreen::new(session, toaster)),
            Route::Profile { username } => {
                Screen::Profile(ProfileScreen::new(username.clone(), session, toaster))
            }
            Route::Users => Screen::Directory(DirectoryScreen::new(session, toaster)),
            Route::NotFound { path } => Screen::NotFound {
                path: path.clone(),
                scope: CancellationToken::new(),
            },
        };
        screen.set_scope(self.interrupt.child_token());
        screen
    }

    async fn mount(&mut self) -> Transition {
        match &mut self.screen {
            Screen::Profile(s) => s.mount(&self.api).await,
            Screen::Directory(s) => s.mount(&self.api).await,
            Screen::Auth(_) | Screen::NotFound { .. } => Transition::Stay,
        }
    }

    async fn apply(&mut self, transition: Transition) {
        if let Transition::Navigate(route) = transition {
            self.navigate(route).await;
        }
    }

    /// Run one user command against the mounted screen.
    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::Empty | Command::Help | Command::Quit => {}
            Command::Go(path) => self.navigate(Route::parse(&path)).await,
            Command::Users => self.navigate(Route::Users).await,
            Command::Toggle => match &mut self.screen {
                Screen::Auth(s) => s.toggle_mode(),
                _ => self.unavailable("toggle"),
            },
            Command::Username(username) => match &mut self.screen {
                Screen::Auth(s) => s.set_username(username),
                _ => self.unavailable("username"),
            },
            Command::Password(password) => match &mut self.screen {
                Screen::Auth(s) => s.set_password(password),
                _ => self.unavailable("password"),
            },
            Command::Submit => {
                let transition = match &mut self.screen {
                    Screen::Auth(s) => s.submit(&self.api).await,
                    _ => return self.unavailable("submit"),
                };
                self.apply(transition).await;
            }
            Command::Login { username, password } => {
                self.fill_and_submit(AuthMode::Login, username, password).await
            }
            Command::Register { username, password } => {
                self.fill_and_submit(AuthMode::Register, username, password).await
            }
            Command::Post(text) => {
                let transition = match &mut self.screen {
                    Screen::Profile(s) => {
                        s.set_draft(text);
                        s.submit_post(&self.api).await
                    }
                    _ => return self.unavailable("post"),
                };
                self.apply(transition).await;
            }
            Command::Refresh => match &mut self.screen {
                Screen::Profile(s) => s.load_posts(&self.api).await,
                Screen::Directory(s) => s.load_users(&self.api).await,
                _ => {}
            },
            Command::Open(choice) => {
                let route = match &self.screen {
                    Screen::Directory(s) => s.select(&choice),
                    Screen::Profile(s) => match choice.parse::<usize>() {
                        Ok(index) => s.open_author(index),
                        Err(_) => Some(Route::profile(choice.clone())),
                    },
                    _ => return self.unavailable("open"),
                };
                match route {
                    Some(route) => self.navigate(route).await,
                    None => self.toaster.error(format!("Nothing to open at '{}'", choice)),
                }
            }
            Command::Back => {
                let transition = match &self.screen {
                    Screen::Directory(s) => s.back(),
                    _ => return self.unavailable("back"),
                };
                self.apply(transition).await;
            }
            Command::Logout => {
                let transition = match &mut self.screen {
                    Screen::Profile(s) => s.logout(),
                    _ => return self.unavailable("logout"),
                };
                self.apply(transition).await;
            }
        }
    }

    async fn fill_and_submit(&mut self, mode: AuthMode, username: String, password: String) {
        if !matches!(self.screen, Screen::Auth(_)) {
            self.navigate(Route::Login).await;
        }
        let transition = match &mut self.screen {
            Screen::Auth(s) => {
                s.set_mode(mode);
                s.set_username(username);
                s.set_password(password);
                s.submit(&self.api).await
            }
            _ => return,
        };
        self.apply(transition).await;
    }

    fn unavailable(&self, what: &str) {
        self.toaster
            .error(format!("'{}' is not available on {}", what, self.route));
    }

    pub fn render(&self) -> String {
        self.screen.render()
    }
}
