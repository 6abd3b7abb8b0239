//! Fail-soft JSON key-value store over a raw string backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages persist small preferences and drafts across reloads. Values are
//! stored as JSON text, so the browser backend is `localStorage` and tests use
//! [`MemoryBackend`].
//!
//! ERROR HANDLING
//! ==============
//! [`Store::set`], [`Store::get`], [`Store::remove`] and [`Store::clear`]
//! never surface errors: failures are logged at `error`, recorded for
//! [`Store::take_error`], and turned into a no-op or `None`. The `try_*`
//! variants and [`Store::lookup`] expose the same failures to callers that
//! want them.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error from a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No storage is reachable (disabled, private mode, no window).
    #[error("storage is unavailable")]
    Unavailable,
    /// Writing `key` would exceed the storage quota.
    #[error("storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },
    /// The value could not be serialized to JSON.
    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The stored text is not valid JSON for the requested type.
    #[error("failed to deserialize value for '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// Any other backend rejection.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Raw string storage, shaped after the Web Storage API.
pub trait StorageBackend {
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the write is rejected; prior state is kept.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Outcome of [`Store::lookup`].
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    Missing,
    Failed(StoreError),
}

impl<T> Lookup<T> {
    /// `Some` only for [`Lookup::Found`].
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing | Self::Failed(_) => None,
        }
    }
}

/// Typed JSON view over a [`StorageBackend`].
pub struct Store<B> {
    backend: B,
    last_error: RefCell<Option<StoreError>>,
}

impl<B: StorageBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, last_error: RefCell::new(None) }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serialize `value` and write it under `key`. Failures are logged and
    /// leave the stored state unchanged.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            self.swallow("saving to", key, e);
        }
    }

    /// Read and deserialize `key`. Missing, empty, and unreadable entries
    /// yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key) {
            Lookup::Found(value) => Some(value),
            Lookup::Missing => None,
            Lookup::Failed(e) => {
                self.swallow("reading from", key, e);
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            self.swallow("removing from", key, e);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            self.swallow("clearing", "*", e);
        }
    }

    /// Read `key` without logging, keeping the failure cause.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        match self.try_get(key) {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::Missing,
            Err(e) => Lookup::Failed(e),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] before touching the backend, or the
    /// backend's write error.
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize { key: key.to_owned(), source })?;
        self.backend.set_item(key, &raw)
    }

    /// # Errors
    ///
    /// Returns the backend's read error or [`StoreError::Deserialize`].
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.backend.get_item(key)? else {
            return Ok(None);
        };
        // An empty string was never written by `set`; treat it as absent.
        if raw.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Deserialize { key: key.to_owned(), source })
    }

    /// # Errors
    ///
    /// Returns the backend's write error.
    pub fn try_remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove_item(key)
    }

    /// # Errors
    ///
    /// Returns the backend's write error.
    pub fn try_clear(&self) -> Result<(), StoreError> {
        self.backend.clear()
    }

    /// Take the most recent error swallowed by a fail-soft operation.
    pub fn take_error(&self) -> Option<StoreError> {
        self.last_error.borrow_mut().take()
    }

    fn swallow(&self, action: &str, key: &str, error: StoreError) {
        log::error!("error {action} storage (key={key}): {error}");
        *self.last_error.borrow_mut() = Some(error);
    }
}

// =============================================================
// In-memory backend
// =============================================================

/// [`StorageBackend`] kept in a map, with an optional byte quota and an
/// availability switch for exercising failure paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    unavailable: Cell<bool>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes that would push the sum of key and value lengths past
    /// `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota_bytes: Some(bytes), ..Self::default() }
    }

    /// Make every subsequent operation fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Raw stored text for `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Write raw text, bypassing serialization and quota.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.get() {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        if let Some(quota) = self.quota_bytes {
            if self.used_bytes_without(key) + key.len() + value.len() > quota {
                return Err(StoreError::QuotaExceeded { key: key.to_owned() });
            }
        }
        self.insert_raw(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
