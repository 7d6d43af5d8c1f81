//! Centralized route guard, evaluated once per navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views never check auth themselves. Navigation asks the guard, which reads
//! one session snapshot and answers allow / show the loader / redirect.

use std::fmt::Write;

use crate::state::session::{Session, SessionStore};

pub const HOME_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";
/// Default destination after signing in.
pub const LANDING_ROUTE: &str = "/problems";

const DEFAULT_PROTECTED: &[&str] = &[
    "/profile",
    "/dashboard",
    "/subscription",
    "/payments",
    "/organization",
    "/internships/apply",
    "/quiz/attempt",
];

const DEFAULT_GUEST_ONLY: &[&str] = &["/login", "/register"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Auth state is still being determined; render the full-screen loader.
    Loading,
    Redirect(String),
}

#[derive(Clone, Debug)]
pub struct RouteGuard {
    protected: Vec<String>,
    guest_only: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            protected: DEFAULT_PROTECTED.iter().map(|p| (*p).to_owned()).collect(),
            guest_only: DEFAULT_GUEST_ONLY.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}

impl RouteGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a protected path prefix.
    #[must_use]
    pub fn protect(mut self, prefix: &str) -> Self {
        self.protected.push(normalize(prefix).to_owned());
        self
    }

    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        let path = normalize(path);
        self.protected.iter().any(|prefix| matches_prefix(path, prefix))
    }

    fn is_guest_only(&self, path: &str) -> bool {
        let path = normalize(path);
        self.guest_only.iter().any(|prefix| matches_prefix(path, prefix))
    }

    #[must_use]
    pub fn evaluate(&self, session: &Session, path: &str) -> GuardDecision {
        if session.is_loading() {
            return GuardDecision::Loading;
        }
        if !session.is_authenticated && self.is_protected(path) {
            tracing::debug!(%path, "redirecting unauthenticated navigation to login");
            return GuardDecision::Redirect(login_redirect(path));
        }
        if session.is_authenticated && self.is_guest_only(path) {
            return GuardDecision::Redirect(LANDING_ROUTE.to_owned());
        }
        GuardDecision::Allow
    }

    /// Where a successful login navigates to.
    #[must_use]
    pub fn landing_route(&self) -> &'static str {
        LANDING_ROUTE
    }

    #[must_use]
    pub fn evaluate_store(&self, store: &SessionStore, path: &str) -> GuardDecision {
        self.evaluate(&store.snapshot(), path)
    }
}

/// Strip query and fragment, and any trailing slash except on the root.
fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { HOME_ROUTE } else { trimmed }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// `/login?next=<path>`, with the original path percent-encoded.
#[must_use]
pub fn login_redirect(path: &str) -> String {
    let mut out = format!("{LOGIN_ROUTE}?next=");
    for byte in path.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'/' | b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::{SessionAction, reduce};
    use crate::state::test_helpers::dummy_user;

    fn anonymous() -> Session {
        reduce(&Session::default(), SessionAction::AuthChecked(None))
    }

    fn signed_in() -> Session {
        reduce(&Session::default(), SessionAction::AuthChecked(Some(dummy_user("u1"))))
    }

    #[test]
    fn loading_while_initializing_without_user() {
        let guard = RouteGuard::new();
        assert_eq!(guard.evaluate(&Session::default(), "/problems"), GuardDecision::Loading);
        assert_eq!(guard.evaluate(&Session::default(), "/profile"), GuardDecision::Loading);
    }

    #[test]
    fn anonymous_protected_route_redirects_to_login_with_next() {
        let guard = RouteGuard::new();
        assert_eq!(
            guard.evaluate(&anonymous(), "/organization/org-1/members"),
            GuardDecision::Redirect("/login?next=/organization/org-1/members".into())
        );
    }

    #[test]
    fn anonymous_public_route_is_allowed() {
        let guard = RouteGuard::new();
        assert_eq!(guard.evaluate(&anonymous(), "/problems"), GuardDecision::Allow);
        assert_eq!(guard.evaluate(&anonymous(), "/"), GuardDecision::Allow);
        assert_eq!(guard.evaluate(&anonymous(), "/profiles-directory"), GuardDecision::Allow);
    }

    #[test]
    fn signed_in_user_passes_protected_routes() {
        let guard = RouteGuard::new();
        assert_eq!(guard.evaluate(&signed_in(), "/dashboard/"), GuardDecision::Allow);
        assert_eq!(guard.evaluate(&signed_in(), "/payments?tab=history"), GuardDecision::Allow);
    }

    #[test]
    fn signed_in_user_bounced_from_login() {
        let guard = RouteGuard::new();
        assert_eq!(guard.evaluate(&signed_in(), "/login"), GuardDecision::Redirect(LANDING_ROUTE.into()));
        assert_eq!(guard.evaluate(&signed_in(), "/register"), GuardDecision::Redirect(guard.landing_route().into()));
    }

    #[test]
    fn custom_protected_prefix() {
        let guard = RouteGuard::new().protect("/certificates/");
        assert!(guard.is_protected("/certificates/abc"));
        assert!(guard.is_protected("/certificates"));
        assert!(!guard.is_protected("/certificate"));
    }

    #[test]
    fn login_redirect_encodes_reserved_characters() {
        assert_eq!(login_redirect("/quiz/attempt?id=5&x"), "/login?next=/quiz/attempt%3Fid%3D5%26x");
    }

    #[test]
    fn evaluate_store_reads_current_snapshot() {
        let store = SessionStore::new();
        let guard = RouteGuard::new();
        assert_eq!(guard.evaluate_store(&store, "/profile"), GuardDecision::Loading);
        store.dispatch(SessionAction::AuthChecked(None));
        assert!(matches!(guard.evaluate_store(&store, "/profile"), GuardDecision::Redirect(_)));
    }
}
