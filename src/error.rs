//! Error types shared by the HTTP wrappers and session services.
//!
//! ERROR HANDLING
//! ==============
//! Backend failures keep the HTTP status and the decoded JSON body so callers
//! can classify them (verification-required, invalid credentials, ...) without
//! re-reading the response. Transport failures carry no status at all, which is
//! how "could not reach the server" is distinguished from "server said no".

use serde_json::Value;

/// Fallback text used when the backend gives no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The backend rejected the session (401).
    #[error("unauthorized")]
    Unauthorized { body: Value },

    /// Any other non-success status.
    #[error("request failed with status {status}: {}", message_or_generic(.body))]
    Status { status: u16, body: Value },

    /// A success response whose body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The owning request scope was torn down before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build the error for a non-success status and its (possibly empty) body.
    #[must_use]
    pub fn from_status(status: u16, raw_body: &str) -> Self {
        let body = serde_json::from_str(raw_body).unwrap_or(Value::Null);
        if status == 401 {
            Self::Unauthorized { body }
        } else {
            Self::Status { status, body }
        }
    }

    /// HTTP status, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded error body, if a response was received.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Unauthorized { body } | Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Server-provided message text, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        self.body().and_then(extract_message)
    }

    /// Message suitable for an inline banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.server_message().unwrap_or(GENERIC_FAILURE_MESSAGE).to_owned()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The backend uses `message` for most routes and `error` for a few older ones.
#[must_use]
pub fn extract_message(body: &Value) -> Option<&str> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
}

fn message_or_generic(body: &Value) -> &str {
    extract_message(body).unwrap_or(GENERIC_FAILURE_MESSAGE)
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
