mod common;

use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::oneshot;
use tokio::time::timeout;

use common::{Call, FakeApi, Reply, messages, post, signed_in, toasts, token_for, user};
use matrix_client::command::Command;
use matrix_client::screens::{AuthMode, AuthScreen, DirectoryScreen, Phase, ProfileScreen, Transition};
use matrix_client::{Route, Screen, SessionContext, Shell};

// -- Auth screen --

#[tokio::test]
async fn login_stores_returned_session_and_opens_profile() {
    let api = FakeApi::new();
    api.set(|s| s.auth = Reply::Ok(token_for("neo", "abc")));
    let session = SessionContext::in_memory(None);
    let (toaster, mut feed) = toasts();

    let mut screen = AuthScreen::new(session.clone(), toaster);
    screen.set_username("neo");
    screen.set_password("x");
    let transition = screen.submit(&api).await;

    assert_eq!(transition, Transition::Navigate(Route::profile("neo")));
    let stored = session.current().unwrap();
    assert_eq!(stored.token, "abc");
    assert_eq!(stored.username, "neo");
    assert_eq!(api.calls(), vec![Call::Login("neo".into())]);
    assert_eq!(messages(&mut feed), vec!["Welcome back to the Matrix"]);
}

#[tokio::test]
async fn navigation_uses_the_username_the_server_returned() {
    let api = FakeApi::new();
    api.set(|s| s.auth = Reply::Ok(token_for("Neo", "abc")));
    let session = SessionContext::in_memory(None);
    let (toaster, _feed) = toasts();

    let mut screen = AuthScreen::new(session.clone(), toaster);
    screen.set_username("neo");
    screen.set_password("x");

    assert_eq!(screen.submit(&api).await, Transition::Navigate(Route::profile("Neo")));
    assert_eq!(session.username().as_deref(), Some("Neo"));
}

#[tokio::test]
async fn register_mode_posts_to_register() {
    let api = FakeApi::new();
    api.set(|s| s.auth = Reply::Ok(token_for("trinity", "t0k")));
    let (toaster, mut feed) = toasts();

    let mut screen = AuthScreen::new(SessionContext::in_memory(None), toaster);
    assert_eq!(screen.mode(), AuthMode::Login);
    screen.toggle_mode();
    assert_eq!(screen.mode(), AuthMode::Register);

    screen.set_username("trinity");
    screen.set_password("x");
    screen.submit(&api).await;

    assert_eq!(api.calls(), vec![Call::Register("trinity".into())]);
    assert_eq!(messages(&mut feed), vec!["Welcome to the Matrix"]);
}

#[tokio::test]
async fn failed_login_writes_nothing_and_shows_server_detail() {
    let api = FakeApi::new();
    api.set(|s| {
        s.auth = Reply::Fail(
            StatusCode::UNAUTHORIZED,
            Some("Invalid username or password".into()),
        )
    });
    let session = SessionContext::in_memory(None);
    let (toaster, mut feed) = toasts();

    let mut screen = AuthScreen::new(session.clone(), toaster);
    screen.set_username("neo");
    screen.set_password("wrong");

    assert_eq!(screen.submit(&api).await, Transition::Stay);
    assert!(!session.is_signed_in());
    assert_eq!(screen.phase(), Phase::Failed);
    assert_eq!(screen.username(), "neo");
    assert_eq!(messages(&mut feed), vec!["Invalid username or password"]);
}

#[tokio::test]
async fn failure_without_detail_uses_generic_message() {
    let api = FakeApi::new();
    api.set(|s| s.auth = Reply::Fail(StatusCode::BAD_GATEWAY, None));
    let (toaster, mut feed) = toasts();

    let mut screen = AuthScreen::new(SessionContext::in_memory(None), toaster);
    screen.set_username("neo");
    screen.set_password("x");
    screen.submit(&api).await;

    assert_eq!(messages(&mut feed), vec!["Authentication failed"]);
}

#[tokio::test]
async fn empty_fields_are_not_submitted() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();

    let mut screen = AuthScreen::new(SessionContext::in_memory(None), toaster);
    screen.set_username("neo");

    assert_eq!(screen.submit(&api).await, Transition::Stay);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn persisted_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = matrix_client::SessionStore::new(dir.path().join("session.json"));

    let api = FakeApi::new();
    api.set(|s| s.auth = Reply::Ok(token_for("neo", "abc")));
    let (toaster, _feed) = toasts();

    let mut screen = AuthScreen::new(SessionContext::load(store.clone()), toaster);
    screen.set_username("neo");
    screen.set_password("x");
    screen.submit(&api).await;

    let restored = SessionContext::load(store);
    assert_eq!(restored.current().unwrap().token, "abc");
}

// -- Profile screen --

#[tokio::test]
async fn profile_without_session_redirects_to_login() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();

    let mut screen = ProfileScreen::new("neo", SessionContext::in_memory(None), toaster);
    assert_eq!(screen.mount(&api).await, Transition::Navigate(Route::Login));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn wall_renders_one_card_per_post_in_server_order() {
    let api = FakeApi::new();
    // Deliberately not chronological: server order wins.
    let served = vec![
        post("neo", "trinity", "Dodge this.", 5),
        post("neo", "neo", "Whoa.", 10),
        post("neo", "morpheus", "Free your mind.", 1),
    ];
    api.set(|s| s.posts = Reply::Ok(served.clone()));
    let (toaster, _feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    assert_eq!(screen.mount(&api).await, Transition::Stay);
    assert_eq!(screen.phase(), Phase::Ready);

    let cards = screen.cards();
    assert_eq!(cards.len(), 3);
    let authors: Vec<&str> = cards.iter().map(|c| c.author.as_str()).collect();
    assert_eq!(authors, vec!["trinity", "neo", "morpheus"]);
    assert_eq!(cards[0].content, "Dodge this.");
    assert_eq!(cards[0].visitor_note.as_deref(), Some("→ posted on neo's wall"));
    assert!(cards[1].visitor_note.is_none());
    assert!(!cards[2].timestamp.is_empty());

    let text = screen.render();
    assert!(text.contains("Free your mind."));
    assert!(text.contains("Your Wall"));
}

#[tokio::test]
async fn empty_wall_shows_empty_state() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    screen.mount(&api).await;
    assert!(screen.render().contains("No posts yet. Be the first to post!"));
}

#[tokio::test]
async fn load_failure_keeps_previous_posts() {
    let api = FakeApi::new();
    api.set(|s| s.posts = Reply::Ok(vec![post("neo", "neo", "still here", 0)]));
    let (toaster, mut feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    screen.mount(&api).await;

    api.set(|s| s.posts = Reply::Fail(StatusCode::INTERNAL_SERVER_ERROR, None));
    screen.load_posts(&api).await;

    assert_eq!(screen.phase(), Phase::Failed);
    assert_eq!(screen.posts().len(), 1);
    assert_eq!(messages(&mut feed), vec!["Failed to load posts"]);
}

#[tokio::test]
async fn failed_first_load_does_not_claim_an_empty_wall() {
    let api = FakeApi::new();
    api.set(|s| s.posts = Reply::Fail(StatusCode::INTERNAL_SERVER_ERROR, None));
    let (toaster, _feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    screen.mount(&api).await;

    let text = screen.render();
    assert!(!text.contains("No posts yet"));
    assert!(text.contains("Posts could not be loaded"));

    api.set(|s| s.posts = Reply::Ok(Vec::new()));
    screen.load_posts(&api).await;
    assert!(screen.render().contains("No posts yet. Be the first to post!"));
}

#[tokio::test]
async fn whitespace_post_is_never_sent() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    screen.mount(&api).await;

    screen.set_draft("   \n\t ");
    assert_eq!(screen.submit_post(&api).await, Transition::Stay);
    assert_eq!(screen.draft(), "   \n\t ");
    assert_eq!(
        api.count(|c| matches!(c, Call::CreatePost { .. })),
        0
    );
}

#[tokio::test]
async fn successful_post_clears_draft_and_refetches_once() {
    let api = FakeApi::new();
    let (toaster, mut feed) = toasts();

    let mut screen = ProfileScreen::new("trinity", signed_in("neo"), toaster);
    screen.mount(&api).await;
    let fetches_before = api.count(|c| matches!(c, Call::WallPosts(_)));

    api.set(|s| s.posts = Reply::Ok(vec![post("trinity", "neo", "I know kung fu.", 0)]));
    screen.set_draft("I know kung fu.");
    screen.submit_post(&api).await;

    assert_eq!(
        api.count(|c| matches!(c, Call::WallPosts(_))),
        fetches_before + 1
    );
    assert_eq!(screen.draft(), "");
    assert_eq!(screen.posts().len(), 1);
    assert!(api.calls().contains(&Call::CreatePost {
        token: "token-neo".into(),
        wall_owner: "trinity".into(),
        content: "I know kung fu.".into(),
    }));
    assert_eq!(messages(&mut feed), vec!["Post created"]);
}

#[tokio::test]
async fn failed_post_keeps_draft_and_does_not_refetch() {
    let api = FakeApi::new();
    api.set(|s| s.create = Reply::Fail(StatusCode::NOT_FOUND, Some("Wall owner not found".into())));
    let (toaster, mut feed) = toasts();

    let mut screen = ProfileScreen::new("smith", signed_in("neo"), toaster);
    screen.mount(&api).await;
    let _ = messages(&mut feed);

    screen.set_draft("Mr. Anderson");
    screen.submit_post(&api).await;

    assert_eq!(screen.draft(), "Mr. Anderson");
    assert_eq!(api.count(|c| matches!(c, Call::WallPosts(_))), 1);
    assert_eq!(messages(&mut feed), vec!["Wall owner not found"]);
}

#[tokio::test]
async fn visiting_a_wall_changes_affordances_only() {
    let api = FakeApi::new();
    let (toaster, mut feed) = toasts();
    let session = signed_in("neo");

    let mut screen = ProfileScreen::new("trinity", session.clone(), toaster);
    screen.mount(&api).await;

    assert!(!screen.is_own_wall());
    assert_eq!(screen.heading(), "User Wall");
    assert_eq!(screen.form_title(), "Write on trinity's Wall");
    assert_eq!(screen.placeholder(), "Write a message for trinity...");
    assert!(!screen.render().contains("logout"));

    assert_eq!(screen.logout(), Transition::Stay);
    assert!(session.is_signed_in());
    assert_eq!(messages(&mut feed).len(), 1);
}

#[tokio::test]
async fn logout_on_own_wall_clears_session() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();
    let session = signed_in("neo");

    let mut screen = ProfileScreen::new("neo", session.clone(), toaster);
    screen.mount(&api).await;

    assert_eq!(screen.placeholder(), "What's on your mind in the Matrix?");
    assert_eq!(screen.logout(), Transition::Navigate(Route::Login));
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn post_author_opens_their_profile() {
    let api = FakeApi::new();
    api.set(|s| s.posts = Reply::Ok(vec![post("neo", "trinity", "hi", 0)]));
    let (toaster, _feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    screen.mount(&api).await;

    assert_eq!(screen.open_author(1), Some(Route::profile("trinity")));
    assert_eq!(screen.open_author(0), None);
    assert_eq!(screen.open_author(2), None);
}

// -- Directory screen --

#[tokio::test]
async fn directory_lists_every_user_and_flags_self() {
    let api = FakeApi::new();
    api.set(|s| s.users = Reply::Ok(vec![user("morpheus"), user("neo"), user("trinity")]));
    let (toaster, _feed) = toasts();

    let mut screen = DirectoryScreen::new(signed_in("neo"), toaster);
    assert_eq!(screen.mount(&api).await, Transition::Stay);

    let entries = screen.entries();
    assert_eq!(entries.len(), 3);
    let flagged: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_self)
        .map(|e| e.username.as_str())
        .collect();
    assert_eq!(flagged, vec!["neo"]);
    assert!(screen.render().contains("neo (You)"));

    assert_eq!(screen.select("3"), Some(Route::profile("trinity")));
    assert_eq!(screen.select("morpheus"), Some(Route::profile("morpheus")));
    assert_eq!(screen.select("smith"), None);
    assert_eq!(screen.back(), Transition::Navigate(Route::profile("neo")));
}

#[tokio::test]
async fn directory_requires_session() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();

    let mut screen = DirectoryScreen::new(SessionContext::in_memory(None), toaster);
    assert_eq!(screen.mount(&api).await, Transition::Navigate(Route::Login));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn directory_failure_notifies() {
    let api = FakeApi::new();
    api.set(|s| s.users = Reply::Fail(StatusCode::SERVICE_UNAVAILABLE, None));
    let (toaster, mut feed) = toasts();

    let mut screen = DirectoryScreen::new(signed_in("neo"), toaster);
    screen.mount(&api).await;

    assert_eq!(screen.phase(), Phase::Failed);
    assert!(screen.entries().is_empty());
    assert_eq!(messages(&mut feed), vec!["Failed to load users"]);
}

// -- Shell --

#[tokio::test]
async fn shell_redirects_unauthenticated_visitors_to_login() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();

    let mut shell = Shell::new(api, SessionContext::in_memory(None), toaster);
    shell.navigate(Route::profile("neo")).await;
    assert_eq!(shell.route(), &Route::Login);

    shell.navigate(Route::Users).await;
    assert_eq!(shell.route(), &Route::Login);
}

#[tokio::test]
async fn shell_login_flow_lands_on_profile() {
    let api = FakeApi::new();
    api.set(|s| {
        s.auth = Reply::Ok(token_for("neo", "abc"));
        s.posts = Reply::Ok(vec![post("neo", "neo", "Whoa.", 0)]);
    });
    let (toaster, _feed) = toasts();
    let session = SessionContext::in_memory(None);

    let mut shell = Shell::new(api.clone(), session.clone(), toaster);
    shell.navigate(Route::Login).await;
    shell
        .handle(Command::Login {
            username: "neo".into(),
            password: "x".into(),
        })
        .await;

    assert_eq!(shell.route(), &Route::profile("neo"));
    assert_eq!(session.current().unwrap().token, "abc");
    match shell.screen() {
        Screen::Profile(s) => assert_eq!(s.posts().len(), 1),
        _ => panic!("expected the profile screen"),
    }

    shell.handle(Command::Users).await;
    assert_eq!(shell.route(), &Route::Users);
    shell.handle(Command::Back).await;
    assert_eq!(shell.route(), &Route::profile("neo"));

    shell.handle(Command::Logout).await;
    assert_eq!(shell.route(), &Route::Login);
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn unknown_paths_render_not_found() {
    let (toaster, _feed) = toasts();
    let mut shell = Shell::new(FakeApi::new(), signed_in("neo"), toaster);

    shell.navigate(Route::parse("/zion")).await;
    assert!(shell.render().contains("404"));
}

#[tokio::test]
async fn navigating_away_discards_a_late_response() {
    let api = FakeApi::new();
    api.set(|s| s.posts = Reply::Hang);
    let (toaster, mut feed) = toasts();

    let mut screen = ProfileScreen::new("neo", signed_in("neo"), toaster);
    let scope = screen.scope().clone();

    let canceller = tokio::spawn(async move {
        tokio::task::yield_now().await;
        scope.cancel();
    });
    assert_eq!(screen.mount(&api).await, Transition::Stay);
    canceller.await.unwrap();

    // The request went out but its outcome never reached the screen.
    assert_eq!(api.count(|c| matches!(c, Call::WallPosts(_))), 1);
    assert_eq!(screen.phase(), Phase::Idle);
    assert!(screen.posts().is_empty());
    assert!(messages(&mut feed).is_empty());
}

#[tokio::test]
async fn shell_cancels_old_screen_scope_on_navigation() {
    let (toaster, _feed) = toasts();
    let mut shell = Shell::new(FakeApi::new(), signed_in("neo"), toaster);

    shell.navigate(Route::profile("neo")).await;
    let old_scope = shell.active_scope();
    assert!(!old_scope.is_cancelled());

    shell.navigate(Route::Users).await;
    assert!(old_scope.is_cancelled());
    assert!(!shell.active_scope().is_cancelled());
}

#[tokio::test]
async fn interrupted_screen_gets_a_fresh_scope() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();
    let mut shell = Shell::new(api.clone(), signed_in("neo"), toaster);
    shell.navigate(Route::profile("neo")).await;

    shell.active_scope().cancel();
    shell.rescope();
    assert!(!shell.active_scope().is_cancelled());

    shell.handle(Command::Refresh).await;
    assert_eq!(api.count(|c| matches!(c, Call::WallPosts(_))), 2);
}

/// Resolves once the returned sender fires, like a Ctrl-C arriving later.
fn interrupt_signal() -> (oneshot::Sender<()>, impl std::future::Future<Output = ()>) {
    let (tx, rx) = oneshot::channel();
    (tx, async move {
        let _ = rx.await;
    })
}

#[tokio::test]
async fn interrupt_abandons_request_of_newly_mounted_screen() {
    let api = FakeApi::new();
    let (toaster, _feed) = toasts();
    let mut shell = Shell::new(api.clone(), signed_in("neo"), toaster);
    shell.navigate(Route::profile("neo")).await;

    api.set(|s| s.users = Reply::Hang);
    let (fire, interrupted) = interrupt_signal();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        let _ = fire.send(());
    });

    timeout(
        Duration::from_secs(5),
        shell.handle_interruptible(Command::Users, interrupted),
    )
    .await
    .expect("interrupt did not abandon the directory request");

    assert_eq!(shell.route(), &Route::Users);
    assert_eq!(api.count(|c| matches!(c, Call::Users)), 1);
    match shell.screen() {
        Screen::Directory(s) => assert_eq!(s.phase(), Phase::Idle),
        _ => panic!("expected the directory"),
    }

    // Re-armed: the next command runs normally.
    assert!(!shell.active_scope().is_cancelled());
    assert!(!shell.interrupt_token().is_cancelled());
    api.set(|s| s.users = Reply::Ok(vec![user("neo")]));
    shell.handle(Command::Refresh).await;
    match shell.screen() {
        Screen::Directory(s) => assert_eq!(s.entries().len(), 1),
        _ => panic!("expected the directory"),
    }
}

#[tokio::test]
async fn first_navigation_can_be_interrupted() {
    let api = FakeApi::new();
    api.set(|s| s.posts = Reply::Hang);
    let (toaster, mut feed) = toasts();
    let mut shell = Shell::new(api.clone(), signed_in("neo"), toaster);

    let (fire, interrupted) = interrupt_signal();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        let _ = fire.send(());
    });

    timeout(
        Duration::from_secs(5),
        shell.handle_interruptible(Command::Go("/profile/neo".into()), interrupted),
    )
    .await
    .expect("interrupt did not abandon the wall request");

    assert_eq!(shell.route(), &Route::profile("neo"));
    assert_eq!(api.count(|c| matches!(c, Call::WallPosts(_))), 1);
    assert!(messages(&mut feed).is_empty());
    assert!(!shell.active_scope().is_cancelled());
}

#[tokio::test]
async fn uninterrupted_command_completes_normally() {
    let api = FakeApi::new();
    api.set(|s| s.posts = Reply::Ok(vec![post("neo", "neo", "Whoa.", 0)]));
    let (toaster, _feed) = toasts();
    let mut shell = Shell::new(api, signed_in("neo"), toaster);

    shell
        .handle_interruptible(Command::Go("/profile/neo".into()), std::future::pending::<()>())
        .await;

    match shell.screen() {
        Screen::Profile(s) => assert_eq!(s.posts().len(), 1),
        _ => panic!("expected the profile screen"),
    }
}

#[tokio::test]
async fn commands_outside_their_screen_are_rejected() {
    let api = FakeApi::new();
    let (toaster, mut feed) = toasts();
    let mut shell = Shell::new(api.clone(), SessionContext::in_memory(None), toaster);
    shell.navigate(Route::Login).await;

    shell.handle(Command::Post("hello".into())).await;
    assert!(api.calls().is_empty());
    assert_eq!(messages(&mut feed), vec!["'post' is not available on /"]);
}
