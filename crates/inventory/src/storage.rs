//! Key-value persistence seam.
//!
//! The store only ever needs "read this slot" and "overwrite this slot", so the
//! storage substrate is kept behind a two-method trait. Implementations live
//! next to their infrastructure (the SQLite one is in the desktop crate); the
//! in-memory one here is used by tests and by embedders that do not persist.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read slot '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write slot '{key}': {reason}")]
    Write { key: String, reason: String },
}

impl StorageError {
    pub fn read(key: &str, reason: impl Into<String>) -> Self {
        Self::Read {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn write(key: &str, reason: impl Into<String>) -> Self {
        Self::Write {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Opaque key-value persistence service.
///
/// Calls are synchronous and blocking; a successful `set` means the value is
/// durable as far as the backend can tell.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory key-value storage.
///
/// Intended for tests/dev. Writes can be made to fail on demand to exercise
/// persistence error paths.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    slots: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot (e.g. with a document written by another session).
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::default();
        if let Ok(mut slots) = storage.slots.write() {
            slots.insert(key.into(), value.into());
        }
        storage
    }

    /// Make subsequent `set` calls fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw slot contents, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.read().ok()?.get(key).cloned()
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StorageError::read(key, "lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::write(key, "writes disabled"));
        }
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::write(key, "lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
