//! Credential login, Google login, registration, password reset, and logout.
//!
//! ERROR HANDLING
//! ==============
//! Login failures are classified into a small taxonomy so the UI can show a
//! distinct message per class:
//! - 403 with `requiresVerification` → no error; the pending user is cached
//!   for the verification page
//! - 400 / 401 → invalid credentials
//! - no HTTP response → connectivity
//! - anything else → generic, with the server's text when it sent any
//!
//! Logout is best-effort: the local session is cleared whatever the backend
//! answers.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use serde_json::Value;

use super::guard::{HOME_ROUTE, LANDING_ROUTE};
use crate::error::ApiError;
use crate::net::auth::AuthApi;
use crate::net::types::{
    AuthResponse, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    User,
};
use crate::state::pending::PendingVerification;
use crate::state::session::{SessionAction, SessionStore};

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const NETWORK_ERROR_MESSAGE: &str = "Unable to connect to the server. Please check your internet connection.";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please try again.";
pub const GOOGLE_LOGIN_DISABLED_MESSAGE: &str = "Google sign-in is not configured for this client.";

// =============================================================================
// FAILURE TAXONOMY
// =============================================================================

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LoginFailure {
    /// Account exists but is not verified yet; `pending` is the user payload.
    #[error("account requires verification")]
    VerificationRequired { pending: Value },
    #[error("{message}")]
    InvalidCredentials { message: String },
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network,
    #[error("{message}")]
    Other { message: String },
}

impl LoginFailure {
    #[must_use]
    pub fn classify(err: &ApiError) -> Self {
        match err.status() {
            Some(403) if requires_verification(err.body()) => {
                let body = err.body().cloned().unwrap_or(Value::Null);
                let pending = body.get("user").cloned().unwrap_or(body);
                Self::VerificationRequired { pending }
            }
            Some(400 | 401) => Self::InvalidCredentials {
                message: err.server_message().unwrap_or(INVALID_CREDENTIALS_MESSAGE).to_owned(),
            },
            None if err.is_network() => Self::Network,
            _ => Self::Other { message: err.server_message().unwrap_or(LOGIN_FAILED_MESSAGE).to_owned() },
        }
    }

    /// Banner text; `None` for the verification case, which shows no error.
    #[must_use]
    pub fn banner(&self) -> Option<String> {
        match self {
            Self::VerificationRequired { .. } => None,
            other => Some(other.to_string()),
        }
    }
}

fn requires_verification(body: Option<&Value>) -> bool {
    body.and_then(|b| b.get("requiresVerification"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self { email: email.trim().to_owned(), password: password.to_owned() }
    }
}

/// Where to go after a successful login, plus the signed-in user.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub user: User,
    pub redirect: &'static str,
    pub message: Option<String>,
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    pending: PendingVerification,
    google_client_id: Option<String>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: SessionStore, pending: PendingVerification) -> Self {
        Self { api, store, pending, google_client_id: None }
    }

    /// Enable Google sign-in with the widget's OAuth client ID. Without one,
    /// `google_login` is refused locally.
    #[must_use]
    pub fn with_google_client_id(mut self, client_id: Option<String>) -> Self {
        self.google_client_id = client_id.filter(|id| !id.trim().is_empty());
        self
    }

    /// Client ID the hosted Google widget is opened with.
    #[must_use]
    pub fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Exchange email + password for a session. The password is cleared from
    /// `form` on success.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; the session is updated either way.
    pub async fn login(&self, form: &mut LoginForm) -> Result<LoginOutcome, LoginFailure> {
        let req = LoginRequest { email: form.email.clone(), password: form.password.clone() };
        let result = self.api.login(&req).await;
        let outcome = self.finish_login(result, "password")?;
        form.password.clear();
        Ok(outcome)
    }

    /// Forward an identity-provider credential to the backend.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; the session is updated either way.
    /// When no Google client ID is configured, returns `Other` without
    /// contacting the backend or touching the session.
    pub async fn google_login(&self, credential: &str) -> Result<LoginOutcome, LoginFailure> {
        if self.google_client_id.is_none() {
            tracing::warn!("google login attempted without a configured client id");
            return Err(LoginFailure::Other { message: GOOGLE_LOGIN_DISABLED_MESSAGE.to_owned() });
        }
        let req = GoogleLoginRequest { credential: credential.to_owned() };
        let result = self.api.google_login(&req).await;
        self.finish_login(result, "google")
    }

    fn finish_login(&self, result: Result<AuthResponse, ApiError>, method: &str) -> Result<LoginOutcome, LoginFailure> {
        match result {
            Ok(resp) => {
                self.pending.clear();
                tracing::info!(user_id = %resp.user.id, method, "login succeeded");
                self.store.dispatch(SessionAction::LoginSucceeded(resp.user.clone()));
                Ok(LoginOutcome { user: resp.user, redirect: LANDING_ROUTE, message: resp.message })
            }
            Err(err) => {
                let failure = LoginFailure::classify(&err);
                match &failure {
                    LoginFailure::VerificationRequired { pending } => {
                        tracing::info!(method, "login pending verification");
                        if let Err(e) = self.pending.store(pending) {
                            tracing::warn!(error = %e, "failed to cache pending verification user");
                        }
                        self.store.dispatch(SessionAction::VerificationRequired);
                    }
                    other => {
                        tracing::warn!(error = %err, method, "login failed");
                        self.store.dispatch(SessionAction::LoginFailed(other.banner()));
                    }
                }
                Err(failure)
            }
        }
    }

    /// Create an account. New accounts must verify before signing in, so the
    /// returned user is cached as pending and the session stays anonymous.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged; callers show `user_message()`.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let resp = self.api.register(req).await?;
        match serde_json::to_value(&resp.user) {
            Ok(payload) => {
                if let Err(e) = self.pending.store(&payload) {
                    tracing::warn!(error = %e, "failed to cache registered user for verification");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode registered user"),
        }
        tracing::info!(user_id = %resp.user.id, "registration accepted");
        Ok(resp)
    }

    /// Request a password-reset email. Returns the backend's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, ApiError> {
        let resp = self
            .api
            .forgot_password(&ForgotPasswordRequest { email: email.trim().to_owned() })
            .await?;
        Ok(resp.message)
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<Option<String>, ApiError> {
        let resp = self
            .api
            .reset_password(&ResetPasswordRequest { token: token.to_owned(), password: password.to_owned() })
            .await?;
        Ok(resp.message)
    }

    /// Dismiss the current error banner.
    pub fn clear_error(&self) {
        self.store.dispatch(SessionAction::ClearError);
    }

    /// Replace the session user after a profile edit.
    pub fn refresh_user(&self, user: User) {
        self.store.dispatch(SessionAction::UserRefreshed(user));
    }

    /// End the session on both sides. Server-side revocation is
    /// fire-and-forget; the local session is always cleared. Returns the route
    /// to navigate to.
    pub async fn logout(&self) -> &'static str {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "backend logout failed; clearing local session anyway");
        }
        self.pending.clear();
        self.store.dispatch(SessionAction::LoggedOut);
        tracing::info!("logged out");
        HOME_ROUTE
    }
}
