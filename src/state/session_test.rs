use super::*;
use crate::state::test_helpers::{dummy_user, org_admin};

fn all_actions() -> Vec<SessionAction> {
    vec![
        SessionAction::AuthChecked(Some(dummy_user("u1"))),
        SessionAction::AuthChecked(None),
        SessionAction::LoginSucceeded(dummy_user("u2")),
        SessionAction::LoginFailed(Some("Invalid credentials".into())),
        SessionAction::LoginFailed(None),
        SessionAction::VerificationRequired,
        SessionAction::LoggedOut,
        SessionAction::UserRefreshed(org_admin("u3")),
        SessionAction::ClearError,
    ]
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_session_is_initializing_and_anonymous() {
    let s = Session::default();
    assert!(s.is_initializing);
    assert!(!s.is_authenticated);
    assert!(s.user.is_none());
    assert!(s.error.is_none());
    assert!(s.is_loading());
}

// =============================================================
// Reducer transitions
// =============================================================

#[test]
fn auth_checked_with_user_authenticates() {
    let s = reduce(&Session::default(), SessionAction::AuthChecked(Some(dummy_user("u1"))));
    assert!(s.is_authenticated);
    assert_eq!(s.user.as_ref().map(|u| u.id.as_str()), Some("u1"));
    assert!(!s.is_initializing);
    assert!(!s.is_loading());
}

#[test]
fn auth_checked_none_clears_without_error() {
    let start = Session { error: Some("stale".into()), ..Session::default() };
    let s = reduce(&start, SessionAction::AuthChecked(None));
    assert!(!s.is_authenticated);
    assert!(s.user.is_none());
    assert!(s.error.is_none());
    assert!(!s.is_initializing);
}

#[test]
fn login_failed_keeps_message() {
    let s = reduce(&Session::default(), SessionAction::LoginFailed(Some("Invalid credentials".into())));
    assert_eq!(s.error.as_deref(), Some("Invalid credentials"));
    assert!(!s.is_authenticated);
}

#[test]
fn login_success_clears_previous_error() {
    let failed = reduce(&Session::default(), SessionAction::LoginFailed(Some("nope".into())));
    let s = reduce(&failed, SessionAction::LoginSucceeded(dummy_user("u1")));
    assert!(s.error.is_none());
    assert!(s.is_authenticated);
}

#[test]
fn verification_required_sets_no_error() {
    let s = reduce(&Session::default(), SessionAction::VerificationRequired);
    assert!(!s.is_authenticated);
    assert!(s.error.is_none());
}

#[test]
fn logged_out_resets_but_stays_initialized() {
    let authed = reduce(&Session::default(), SessionAction::LoginSucceeded(dummy_user("u1")));
    let s = reduce(&authed, SessionAction::LoggedOut);
    assert!(!s.is_authenticated);
    assert!(s.user.is_none());
    assert!(!s.is_initializing);
}

#[test]
fn user_refreshed_replaces_user_when_authenticated() {
    let authed = reduce(&Session::default(), SessionAction::LoginSucceeded(dummy_user("u1")));
    let s = reduce(&authed, SessionAction::UserRefreshed(org_admin("u1")));
    assert!(s.user.unwrap().organization.is_some());
}

#[test]
fn user_refreshed_ignored_when_anonymous() {
    let anon = reduce(&Session::default(), SessionAction::AuthChecked(None));
    let s = reduce(&anon, SessionAction::UserRefreshed(dummy_user("u1")));
    assert_eq!(s, anon);
}

#[test]
fn clear_error_only_touches_error() {
    let failed = reduce(&Session::default(), SessionAction::LoginFailed(Some("x".into())));
    let s = reduce(&failed, SessionAction::ClearError);
    assert_eq!(s, Session { error: None, ..failed });
}

// =============================================================
// Invariants over action sequences
// =============================================================

#[test]
fn authenticated_iff_user_after_every_sequence() {
    let actions = all_actions();
    for a in &actions {
        for b in &actions {
            for c in &actions {
                let mut s = Session::default();
                for action in [a, b, c] {
                    s = reduce(&s, action.clone());
                    assert_eq!(
                        s.is_authenticated,
                        s.user.is_some(),
                        "invariant broken after {} in sequence {} -> {} -> {}",
                        action.name(),
                        a.name(),
                        b.name(),
                        c.name()
                    );
                }
            }
        }
    }
}

#[test]
fn initializing_never_returns_once_cleared() {
    let actions = all_actions();
    for first in actions.iter().filter(|a| !matches!(a, SessionAction::UserRefreshed(_) | SessionAction::ClearError)) {
        let cleared = reduce(&Session::default(), first.clone());
        assert!(!cleared.is_initializing, "{} should clear initializing", first.name());
        for next in &actions {
            assert!(!reduce(&cleared, next.clone()).is_initializing);
        }
    }
}

// =============================================================
// Store
// =============================================================

#[tokio::test]
async fn store_dispatch_notifies_subscribers() {
    let store = SessionStore::new();
    let mut rx = store.subscribe();
    assert!(rx.borrow().is_initializing);

    store.dispatch(SessionAction::LoginSucceeded(dummy_user("u1")));
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_authenticated);
    assert!(store.is_authenticated());
    assert_eq!(store.user().map(|u| u.id), Some("u1".to_owned()));
}

#[test]
fn store_clones_share_state() {
    let store = SessionStore::new();
    let view = store.clone();
    store.dispatch(SessionAction::AuthChecked(Some(dummy_user("u9"))));
    assert_eq!(view.snapshot().user.map(|u| u.id), Some("u9".to_owned()));
}
