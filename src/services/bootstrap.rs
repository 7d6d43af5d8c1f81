//! Session bootstrap: decide once per process whether a backend cookie
//! session already exists.
//!
//! DESIGN
//! ======
//! `run_once` is the app-mount entry point and is guarded by a one-shot flag.
//! `check` is the re-callable auth check. It de-duplicates with a time window
//! rather than a lock: a call landing within `throttle` of the previous one
//! returns the cached user without touching the network.
//!
//! ERROR HANDLING
//! ==============
//! A 401 earns exactly one refresh followed by one retry. Every other failure,
//! at any stage, ends in an unauthenticated session. Nothing is surfaced to the
//! caller or stored in `Session::error`; a first-load auth hiccup must never
//! block navigation.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::ApiError;
use crate::net::auth::AuthApi;
use crate::net::types::User;
use crate::state::session::{Session, SessionAction, SessionStore};

pub struct Bootstrap {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    throttle: Duration,
    started: AtomicBool,
    /// Start time of the last check that reached the network.
    last_check: Mutex<Option<Instant>>,
}

impl Bootstrap {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: SessionStore, throttle: Duration) -> Self {
        Self { api, store, throttle, started: AtomicBool::new(false), last_check: Mutex::new(None) }
    }

    /// Run the mount-time check. Later calls return the current snapshot
    /// without doing anything.
    pub async fn run_once(&self) -> Session {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("bootstrap already ran");
            return self.store.snapshot();
        }
        self.check().await;
        self.store.snapshot()
    }

    /// Throttled auth check. Returns the resulting (or cached) user.
    pub async fn check(&self) -> Option<User> {
        self.check_at(Instant::now()).await
    }

    async fn check_at(&self, now: Instant) -> Option<User> {
        if !self.claim_window(now) {
            tracing::debug!(throttle_ms = self.throttle.as_millis(), "auth check throttled; using cached user");
            return self.store.user();
        }

        let user = self.resolve_user().await;
        self.store.dispatch(SessionAction::AuthChecked(user.clone()));
        user
    }

    /// Record `now` as the latest check unless one started within the window.
    fn claim_window(&self, now: Instant) -> bool {
        let mut last = self
            .last_check
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(prev) = *last {
            if now.saturating_duration_since(prev) < self.throttle {
                return false;
            }
        }
        *last = Some(now);
        true
    }

    async fn resolve_user(&self) -> Option<User> {
        match self.api.current_user().await {
            Ok(user) => Some(user),
            Err(ApiError::Unauthorized { .. }) => self.refresh_and_retry().await,
            Err(e) => {
                tracing::debug!(error = %e, "auth check failed; treating as signed out");
                None
            }
        }
    }

    async fn refresh_and_retry(&self) -> Option<User> {
        if let Err(e) = self.api.refresh_token().await {
            tracing::debug!(error = %e, "session refresh rejected");
            return None;
        }
        match self.api.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "auth check failed after successful refresh");
                None
            }
        }
    }
}
