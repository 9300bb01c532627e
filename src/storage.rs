// Key-value storage backends the record store persists into

use eyre::{Result, eyre};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Named-entry key-value storage, shaped like a browser's local storage.
///
/// Implementations must be safe to share between threads; the record store
/// serializes its own read-modify-write cycles on top.
pub trait Storage: Send + Sync {
    /// Read an entry, `None` if it has never been written or was removed
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite an entry
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove an entry; removing a missing entry is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// Process-local storage, gone when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| eyre!("Memory storage lock poisoned"))
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Storage for contexts where nothing can be persisted.
///
/// Every call fails; the record store turns that into empty reads and
/// no-op writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl Storage for UnavailableStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Err(eyre!("Storage unavailable, cannot read {}", key))
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<()> {
        Err(eyre!("Storage unavailable, cannot write {}", key))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        Err(eyre!("Storage unavailable, cannot remove {}", key))
    }
}

/// Validate a storage key before it is used as a file name or table key
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid storage key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

/// Validate a key namespace: every `{namespace}_{collection}` key built from it
/// must itself be a valid storage key
pub fn validate_namespace(namespace: &str) -> Result<()> {
    // "users" and "tasks" are the longest collection names
    validate_key(&format!("{}_users", namespace))
        .map_err(|e| eyre!("Invalid namespace {:?}: {}", namespace, e))
}
