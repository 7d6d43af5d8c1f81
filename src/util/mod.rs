//! Shared client utilities.

pub mod cancel;
pub mod storage;
