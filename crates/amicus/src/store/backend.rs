//! Key-value persistence backends.
//!
//! Persisted state lives in independent slots under fixed, well-known keys:
//! the attendance record sequence and the signed-in session. Each slot holds
//! a single JSON blob that is rewritten whole on every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Error, Result};

/// Slot key for the attendance record sequence.
pub const RECORDS_KEY: &str = "attendance-records";

/// Slot key for the signed-in session.
pub const SESSION_KEY: &str = "amicus-session";

/// A persistent string key-value store.
///
/// Writes are synchronous relative to the calling mutation: once `put`
/// returns, the next `get` within the process observes the new value.
pub trait StateBackend: Send + Sync + std::fmt::Debug {
    /// Read the blob stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write fails.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Clear the slot under `key`. Clearing an empty slot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying removal fails.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` file per slot under a state directory.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a file backend rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }
        debug!("State directory at {}", dir.display());
        Ok(Self { dir })
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::StateRead {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.slot_path(key), value).map_err(|source| Error::StateWrite {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::StateWrite {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| Error::internal("state mutex poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::internal("state mutex poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::internal("state mutex poisoned"))?;
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_round_trip() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("a").unwrap(), None);

        backend.put("a", "[1,2,3]").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("[1,2,3]"));

        backend.put("a", "[]").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_memory_backend_remove() {
        let backend = MemoryBackend::new();
        backend.put("a", "x").unwrap();
        backend.remove("a").unwrap();
        assert_eq!(backend.get("a").unwrap(), None);

        // Removing an empty slot is a no-op.
        backend.remove("a").unwrap();
    }

    #[test]
    fn test_memory_backend_independent_slots() {
        let backend = MemoryBackend::new();
        backend.put(RECORDS_KEY, "[]").unwrap();
        backend.put(SESSION_KEY, "{}").unwrap();

        backend.remove(SESSION_KEY).unwrap();
        assert!(backend.get(RECORDS_KEY).unwrap().is_some());
        assert!(backend.get(SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = std::env::temp_dir().join(format!("amicus_backend_test_{}", std::process::id()));
        let backend = FileBackend::open(&dir).unwrap();

        assert_eq!(backend.get("slot").unwrap(), None);
        backend.put("slot", r#"{"hello": true}"#).unwrap();
        assert_eq!(
            backend.get("slot").unwrap().as_deref(),
            Some(r#"{"hello": true}"#)
        );

        backend.remove("slot").unwrap();
        assert_eq!(backend.get("slot").unwrap(), None);
        backend.remove("slot").unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_backend_creates_directory() {
        let dir = std::env::temp_dir().join(format!(
            "amicus_backend_nested_{}/state",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());

        let backend = FileBackend::open(&dir).unwrap();
        assert!(dir.exists());
        assert!(backend.slot_path("k").ends_with("k.json"));

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }
}
