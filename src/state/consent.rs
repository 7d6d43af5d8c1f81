//! Cookie-consent preferences, persisted independently of the session.
//!
//! Written on the first consent action and overwritten by every later one;
//! there is no client-side expiry.

#[cfg(test)]
#[path = "consent_test.rs"]
mod consent_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::util::storage::{KeyValueStorage, StorageError, load_json, save_json};

pub const CONSENT_STORAGE_KEY: &str = "cookieConsent";

/// The four consent categories. `essential` cannot be declined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPreferences {
    pub essential: bool,
    pub functional: bool,
    pub analytics: bool,
    pub marketing: bool,
}

impl ConsentPreferences {
    #[must_use]
    pub fn all() -> Self {
        Self { essential: true, functional: true, analytics: true, marketing: true }
    }

    #[must_use]
    pub fn essential_only() -> Self {
        Self { essential: true, functional: false, analytics: false, marketing: false }
    }
}

/// Stored consent record: the preferences plus when they were given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieConsent {
    #[serde(flatten)]
    pub preferences: ConsentPreferences,
    /// RFC 3339 UTC time of the consent action.
    pub timestamp: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsentCategory {
    Essential,
    Functional,
    Analytics,
    Marketing,
}

impl CookieConsent {
    #[must_use]
    pub fn allows(&self, category: ConsentCategory) -> bool {
        let p = &self.preferences;
        match category {
            ConsentCategory::Essential => true,
            ConsentCategory::Functional => p.functional,
            ConsentCategory::Analytics => p.analytics,
            ConsentCategory::Marketing => p.marketing,
        }
    }
}

#[derive(Clone)]
pub struct ConsentStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl ConsentStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// The stored record, or `None` if the user has not decided yet.
    #[must_use]
    pub fn load(&self) -> Option<CookieConsent> {
        load_json(self.storage.as_ref(), CONSENT_STORAGE_KEY)
    }

    #[must_use]
    pub fn has_decided(&self) -> bool {
        self.load().is_some()
    }

    /// Whether `category` may be used. Undecided users get essential only.
    #[must_use]
    pub fn allows(&self, category: ConsentCategory) -> bool {
        self.load()
            .map_or(category == ConsentCategory::Essential, |c| c.allows(category))
    }

    /// Persist `prefs`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn save(&self, prefs: ConsentPreferences) -> Result<CookieConsent, StorageError> {
        self.save_at(prefs, OffsetDateTime::now_utc())
    }

    /// "Accept all" banner button.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn accept_all(&self) -> Result<CookieConsent, StorageError> {
        self.save(ConsentPreferences::all())
    }

    /// Keep essential cookies only.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn reject_non_essential(&self) -> Result<CookieConsent, StorageError> {
        self.save(ConsentPreferences::essential_only())
    }

    fn save_at(&self, prefs: ConsentPreferences, now: OffsetDateTime) -> Result<CookieConsent, StorageError> {
        let record = CookieConsent {
            preferences: ConsentPreferences { essential: true, ..prefs },
            timestamp: format_timestamp(now),
        };
        save_json(self.storage.as_ref(), CONSENT_STORAGE_KEY, &record)?;
        tracing::debug!(
            functional = record.preferences.functional,
            analytics = record.preferences.analytics,
            marketing = record.preferences.marketing,
            "cookie consent saved"
        );
        Ok(record)
    }
}

fn format_timestamp(now: OffsetDateTime) -> String {
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
