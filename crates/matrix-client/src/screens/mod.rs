pub mod auth;
pub mod directory;
pub mod profile;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::route::Route;

pub use auth::{AuthMode, AuthScreen};
pub use directory::DirectoryScreen;
pub use profile::ProfileScreen;

/// Load state shared by all screens: `Idle → Loading → {Ready, Failed}`.
/// Nothing retries on its own; the user re-navigates or resubmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What a screen wants the shell to do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Navigate(Route),
}

/// Await `fut` unless the screen's scope is cancelled first. `None` means
/// the result was discarded and must not touch screen state.
pub(crate) async fn scoped<F: Future>(scope: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = scope.cancelled() => None,
        out = fut => Some(out),
    }
}
