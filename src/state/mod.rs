//! Client-owned records: the session, cookie consent, and the pending
//! verification payload.

pub mod consent;
pub mod pending;
pub mod session;

// =============================================================================
// TEST HELPERS
// =============================================================================
