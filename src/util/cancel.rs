//! Request scopes that cancel in-flight fetches when their owner goes away.
//!
//! A view (page, dashboard, CLI command) creates one scope and routes every
//! request through it. Dropping the scope cancels all of them, so a stale
//! response can never land in state after the view has been torn down.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct RequestScope {
    token: CancellationToken,
}

impl RequestScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested scope: cancelled with its parent, but cancelling it leaves the
    /// parent running.
    #[must_use]
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token() }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Await `fut` unless the scope is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Cancelled` if the scope is cancelled first, otherwise
    /// whatever `fut` returns.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        run_until_cancelled(self.token.clone(), fut).await
    }

    /// Spawn `fut` on the runtime, bound to this scope's lifetime.
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<Result<T, ApiError>>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        let token = self.token.clone();
        tokio::spawn(run_until_cancelled(token, fut))
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_until_cancelled<F, T>(token: CancellationToken, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(ApiError::Cancelled),
        res = fut => res,
    }
}
