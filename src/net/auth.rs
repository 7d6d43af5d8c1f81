//! Auth endpoints and the `AuthApi` seam the session services depend on.
//!
//! DESIGN
//! ======
//! Session logic (bootstrap, login taxonomy, logout) talks to the backend only
//! through `AuthApi`, so it can be exercised against scripted fakes. The real
//! implementation is a one-line mapping per endpoint onto `ApiClient`.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use super::http::ApiClient;
use super::types::{
    AuthResponse, CurrentUserResponse, ForgotPasswordRequest, GoogleLoginRequest, LoginRequest, MessageResponse,
    RegisterRequest, ResetPasswordRequest, User,
};
use crate::error::ApiError;

pub const LOGIN_PATH: &str = "/login";
pub const GOOGLE_LOGIN_PATH: &str = "/google-login";
pub const REGISTER_PATH: &str = "/register";
pub const LOGOUT_PATH: &str = "/logout";
pub const CURRENT_USER_PATH: &str = "/user";
pub const REFRESH_TOKEN_PATH: &str = "/refresh-token";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/reset-password";

#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;

    async fn google_login(&self, req: &GoogleLoginRequest) -> Result<AuthResponse, ApiError>;

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;

    /// Fetch the user bound to the current session cookie.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Ask the backend to rotate the session cookie.
    async fn refresh_token(&self) -> Result<(), ApiError>;

    async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<MessageResponse, ApiError>;

    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<MessageResponse, ApiError>;
}

#[async_trait::async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(LOGIN_PATH, req).await
    }

    async fn google_login(&self, req: &GoogleLoginRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(GOOGLE_LOGIN_PATH, req).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(REGISTER_PATH, req).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty(LOGOUT_PATH).await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        let resp: CurrentUserResponse = self.get_json(CURRENT_USER_PATH).await?;
        Ok(resp.into_user())
    }

    async fn refresh_token(&self) -> Result<(), ApiError> {
        self.post_empty(REFRESH_TOKEN_PATH).await
    }

    async fn forgot_password(&self, req: &ForgotPasswordRequest) -> Result<MessageResponse, ApiError> {
        let resp: Option<MessageResponse> = self.post_json(FORGOT_PASSWORD_PATH, req).await?;
        Ok(resp.unwrap_or_default())
    }

    async fn reset_password(&self, req: &ResetPasswordRequest) -> Result<MessageResponse, ApiError> {
        let resp: Option<MessageResponse> = self.post_json(RESET_PASSWORD_PATH, req).await?;
        Ok(resp.unwrap_or_default())
    }
}
