//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session is the only shared mutable client state. It lives in one
//! `SessionStore`; route guards and views read snapshots or subscribe, and the
//! auth services are the only callers of `dispatch`. Every transition goes
//! through the pure `reduce` function.
//!
//! INVARIANTS
//! ==========
//! - `is_authenticated == user.is_some()` after every transition.
//! - `is_initializing` starts `true` and is only ever cleared by actions.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::types::User;

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<User>,
    /// True until the first auth check, login, or logout completes.
    pub is_initializing: bool,
    /// Last user-facing auth error, if any.
    pub error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self { is_authenticated: false, user: None, is_initializing: true, error: None }
    }
}

impl Session {
    fn authenticated(user: User) -> Self {
        Self { is_authenticated: true, user: Some(user), is_initializing: false, error: None }
    }

    fn unauthenticated(error: Option<String>) -> Self {
        Self { is_authenticated: false, user: None, is_initializing: false, error }
    }

    /// Whether the app should show its full-screen loader instead of routes.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_initializing && self.user.is_none()
    }
}

/// The complete set of session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    /// Bootstrap finished; `None` means no valid backend session.
    AuthChecked(Option<User>),
    LoginSucceeded(User),
    /// Login rejected; carries the banner text.
    LoginFailed(Option<String>),
    /// Credentials were right but the account still needs verification.
    VerificationRequired,
    LoggedOut,
    /// Profile edits returned a fresh user record.
    UserRefreshed(User),
    ClearError,
}

impl SessionAction {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthChecked(_) => "auth_checked",
            Self::LoginSucceeded(_) => "login_succeeded",
            Self::LoginFailed(_) => "login_failed",
            Self::VerificationRequired => "verification_required",
            Self::LoggedOut => "logged_out",
            Self::UserRefreshed(_) => "user_refreshed",
            Self::ClearError => "clear_error",
        }
    }
}

/// Apply one action to a session snapshot.
#[must_use]
pub fn reduce(state: &Session, action: SessionAction) -> Session {
    match action {
        SessionAction::AuthChecked(Some(user)) | SessionAction::LoginSucceeded(user) => Session::authenticated(user),
        SessionAction::AuthChecked(None) | SessionAction::VerificationRequired | SessionAction::LoggedOut => {
            Session::unauthenticated(None)
        }
        SessionAction::LoginFailed(error) => Session::unauthenticated(error),
        SessionAction::UserRefreshed(user) => {
            if state.is_authenticated {
                Session { user: Some(user), ..state.clone() }
            } else {
                state.clone()
            }
        }
        SessionAction::ClearError => Session { error: None, ..state.clone() },
    }
}

/// Single-writer container for the session with change notification.
#[derive(Clone, Debug)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_authenticated
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.tx.borrow().user.clone()
    }

    /// Receive every subsequent session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Apply `action` and notify subscribers. Returns the new snapshot.
    pub fn dispatch(&self, action: SessionAction) -> Session {
        let name = action.name();
        self.tx.send_modify(|session| *session = reduce(session, action));
        let next = self.snapshot();
        tracing::debug!(
            action = name,
            authenticated = next.is_authenticated,
            initializing = next.is_initializing,
            "session updated"
        );
        next
    }
}
