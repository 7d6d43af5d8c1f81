//! Cookie-carrying HTTP client for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! The backend session lives in an HTTP-only cookie, so the client keeps a
//! cookie jar and never attaches a token itself. Every endpoint wrapper in
//! `net::*` goes through the helpers here so status handling and error-body
//! decoding stay identical across auth, payments, organizations, and catalog.
//!
//! The jar can be exported as a `Cookie` header value and seeded back into a
//! fresh client, which is how a session outlives one process.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ApiError;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.api_base_url.trim_end_matches('/').to_owned(), jar })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn cookie_url(&self) -> Result<Url, ApiError> {
        Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    /// The cookies the jar would send to the API, as a `Cookie` header value
    /// (`name=value; name2=value2`). `None` when no session cookie is held.
    #[must_use]
    pub fn session_cookies(&self) -> Option<String> {
        let url = self.cookie_url().ok()?;
        let header = self.jar.cookies(&url)?;
        header.to_str().ok().map(str::to_owned)
    }

    /// Seed the jar from a value produced by [`ApiClient::session_cookies`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the configured base URL cannot scope cookies.
    pub fn restore_session_cookies(&self, header: &str) -> Result<(), ApiError> {
        let url = self.cookie_url()?;
        for pair in header.split(';').map(str::trim).filter(|p| p.contains('=')) {
            self.jar.add_cookie_str(pair, &url);
        }
        Ok(())
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the mapped `ApiError` for transport failures and non-2xx statuses, or `Decode` if the body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        decode_json(resp).await
    }

    /// `POST` a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// Returns the mapped `ApiError` for transport failures and non-2xx statuses, or `Decode` if the body does not match `T`.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::POST, path).json(body)).await?;
        decode_json(resp).await
    }

    /// `POST` with no body, discarding whatever the backend answers.
    ///
    /// # Errors
    ///
    /// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, path)).await?;
        Ok(())
    }

    /// `PUT` a JSON body and decode a JSON response.
    ///
    /// # Errors
    ///
    /// Returns the mapped `ApiError` for transport failures and non-2xx statuses, or `Decode` if the body does not match `T`.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(self.request(Method::PUT, path).json(body)).await?;
        decode_json(resp).await
    }

    /// `DELETE` a resource, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    /// `GET` a binary document (receipts).
    ///
    /// # Errors
    ///
    /// Returns the mapped `ApiError` for transport failures and non-2xx statuses.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let resp = self.send(self.request(Method::GET, path)).await?;
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            tracing::debug!(error = %e, base_url = %self.base_url, "request failed before response");
            ApiError::from(e)
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let path = resp.url().path().to_owned();
        let text = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %path, "backend returned error status");
        Err(ApiError::from_status(status.as_u16(), &text))
    }
}

async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let text = resp.text().await?;
    parse_body(&text)
}

/// Percent-encode one path segment so ids cannot reshape the endpoint.
pub(crate) fn path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Empty bodies decode as JSON `null` so `Option<T>`/`Value` targets still work.
pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let raw = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(raw).map_err(|e| ApiError::Decode(e.to_string()))
}
