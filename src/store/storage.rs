//! Capacity-bounded key-value storage backends.
//!
//! DESIGN
//! ======
//! Values are opaque strings (JSON documents). Every backend has a byte
//! ceiling measured as the sum of key and value lengths; a write that would
//! cross it fails with [`StorageError::QuotaExceeded`] and leaves the stored
//! data untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, capacity {capacity}")]
    QuotaExceeded { needed: usize, capacity: usize },
    #[error("storage io error: {0}")]
    Io(String),
}

impl StorageError {
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

/// Synchronous key-value backend. Owned by exactly one writer.
pub trait KvStorage: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or replace `key`.
    ///
    /// # Errors
    ///
    /// [`StorageError::QuotaExceeded`] when the write would cross capacity,
    /// [`StorageError::Io`] when a durable backend cannot persist it.
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] when a durable backend cannot persist the removal.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Vec<String>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    capacity: usize,
}

impl MemoryStorage {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { entries: BTreeMap::new(), capacity }
    }

    fn with_entries(entries: BTreeMap<String, String>, capacity: usize) -> Self {
        Self { entries, capacity }
    }

    /// Bytes currently used.
    #[must_use]
    pub fn used(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn check_capacity(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let existing = self.entries.get(key).map_or(0, |v| key.len() + v.len());
        let needed = self.used() - existing + key.len() + value.len();
        if needed > self.capacity {
            return Err(StorageError::QuotaExceeded { needed, capacity: self.capacity });
        }
        Ok(())
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_capacity(key, &value)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// =============================================================================
// FILE
// =============================================================================

/// All keys in one JSON object file, rewritten whole on every mutation via
/// a temp file and rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    mem: MemoryStorage,
}

impl FileStorage {
    /// Open (or lazily create) the store at `path`. An unreadable document is
    /// logged and replaced by an empty one on the next write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<BTreeMap<String, String>>(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "store file unreadable; starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::Io(format!("{}: {e}", path.display()))),
        };
        Ok(Self { path, mem: MemoryStorage::with_entries(entries, capacity) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let io = |e: std::io::Error| StorageError::Io(format!("{}: {e}", self.path.display()));
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io)?;
        }
        let body = serde_json::to_string(&self.mem.entries).map_err(|e| StorageError::Io(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(io)?;
        std::fs::rename(&tmp, &self.path).map_err(io)
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.mem.get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let previous = self.mem.get(key);
        self.mem.set(key, value)?;
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => self.mem.entries.insert(key.to_string(), old),
                None => self.mem.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let Some(previous) = self.mem.entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.mem.entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.mem.keys()
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
