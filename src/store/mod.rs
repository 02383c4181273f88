//! Persistent Store: named collections with seed-on-first-load semantics.
//!
//! Each collection (users, companies, invoices, payments, tickets, logs) is
//! persisted as one JSON array under a namespaced key. The backend is
//! pluggable so the server can use durable files while tests get an isolated
//! in-memory map.

pub mod seeds;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;

use crate::record::normalize_ids;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Raw key-value persistence seam beneath the store.
pub trait StorageBackend: Send {
    /// Read the stored payload for a key; `None` when nothing was ever saved.
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write the payload for a key, creating it if needed.
    fn write_raw(&mut self, key: &str, payload: &str) -> Result<(), StoreError>;
}

/// Durable backend: one `<key>.json` file per collection under a data dir.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_raw(&mut self, key: &str, payload: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), payload)?;
        Ok(())
    }
}

/// In-memory backend for isolated tests; nothing survives the instance.
#[derive(Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write_raw(&mut self, key: &str, payload: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

/// Collection store over a [`StorageBackend`].
///
/// `load` falls back to the provided seed on first use or on corrupted data;
/// `save` is best-effort. Both log rather than surface storage failures, so
/// a broken disk degrades the mock to memory-only instead of breaking the
/// console.
pub struct Db {
    prefix: String,
    backend: Box<dyn StorageBackend>,
}

impl Db {
    pub fn new(backend: Box<dyn StorageBackend>, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            backend,
        }
    }

    /// Durable store under the configured data directory.
    pub fn file(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self::new(Box::new(FileBackend::new(dir)), prefix)
    }

    /// Isolated, non-durable store.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()), "mockdb_")
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Load a named collection, seeding it on first use.
    ///
    /// Corrupted stored data is treated as "no stored value": the collection
    /// is reseeded and the corruption reported through a warn-level event.
    /// The returned collection is always a deep copy with ids normalized;
    /// callers never share structure with the seed constant.
    pub fn load(&mut self, name: &str, seed: &[Value]) -> Vec<Value> {
        let key = self.key(name);

        match self.backend.read_raw(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(mut stored) => {
                    normalize_ids(&mut stored);
                    return stored;
                }
                Err(e) => {
                    tracing::warn!(collection = name, error = %e, "stored collection corrupted; reseeding");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(collection = name, error = %e, "failed to read stored collection; reseeding");
            }
        }

        let mut fresh: Vec<Value> = seed.to_vec();
        normalize_ids(&mut fresh);
        self.save(name, &fresh);
        fresh
    }

    /// Persist a named collection. Side effect only; failures are logged and
    /// swallowed.
    pub fn save(&mut self, name: &str, collection: &[Value]) {
        let key = self.key(name);
        let payload = match serde_json::to_string(collection) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(collection = name, error = %e, "failed to serialize collection");
                return;
            }
        };
        if let Err(e) = self.backend.write_raw(&key, &payload) {
            tracing::warn!(collection = name, error = %e, "failed to persist collection");
        }
    }
}
