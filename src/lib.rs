//! Client-side session and service layer for the Hireveu learning platform.
//!
//! ARCHITECTURE
//! ============
//! `net` wraps the backend REST API, `state` holds the client-owned records
//! (session, cookie consent, pending verification), and `services` owns the
//! multi-step flows that tie the two together: bootstrap, login/logout, and
//! route guarding. Everything the backend decides (entitlements, grading,
//! billing math) is consumed as opaque JSON.

pub mod config;
pub mod error;
pub mod net;
pub mod services;
pub mod state;
pub mod util;

pub use config::ClientConfig;
pub use error::ApiError;
pub use net::http::ApiClient;
pub use net::types::User;
pub use state::session::{Session, SessionAction, SessionStore};
