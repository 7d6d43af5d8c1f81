//! Session flows layered over the auth API and the session store.
//!
//! ARCHITECTURE
//! ============
//! Services own the multi-step control flow (throttle, refresh-and-retry,
//! failure classification, best-effort logout) so views only read session
//! snapshots and route decisions.

pub mod auth;
pub mod bootstrap;
pub mod guard;

// =============================================================================
// TEST HELPERS
// =============================================================================
