//! Cache for the user payload of a login that still needs verification.
//!
//! Login writes it on a verification-required rejection; the verification
//! flow reads it; logout and the next successful login clear it.

use std::sync::Arc;

use serde_json::Value;

use crate::util::storage::{KeyValueStorage, StorageError, load_json, save_json};

pub const PENDING_VERIFICATION_KEY: &str = "pendingVerificationUser";

#[derive(Clone)]
pub struct PendingVerification {
    storage: Arc<dyn KeyValueStorage>,
}

impl PendingVerification {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// # Errors
    ///
    /// Returns an error if the payload cannot be written.
    pub fn store(&self, payload: &Value) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), PENDING_VERIFICATION_KEY, payload)
    }

    #[must_use]
    pub fn load(&self) -> Option<Value> {
        load_json(self.storage.as_ref(), PENDING_VERIFICATION_KEY)
    }

    /// Email of the pending user, for prefilling the verification form.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.load()?.get("email")?.as_str().map(str::to_owned)
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(PENDING_VERIFICATION_KEY) {
            tracing::warn!(error = %e, "failed to clear pending verification user");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::storage::MemoryStorage;
    use serde_json::json;

    #[test]
    fn store_load_clear() {
        let pending = PendingVerification::new(Arc::new(MemoryStorage::new()));
        assert!(pending.load().is_none());

        pending.store(&json!({ "email": "new@x.com", "name": "New" })).unwrap();
        assert_eq!(pending.email().as_deref(), Some("new@x.com"));

        pending.clear();
        assert!(pending.load().is_none());
        assert!(pending.email().is_none());
    }

    #[test]
    fn email_missing_from_payload_is_none() {
        let pending = PendingVerification::new(Arc::new(MemoryStorage::new()));
        pending.store(&json!({ "id": "u1" })).unwrap();
        assert!(pending.email().is_none());
    }
}
