//! # Key-Value Storage
//!
//! Durable backends for the cart. The cart is stored as one opaque value
//! under one key, so a backend only needs whole-value `get` and `set`.
//!
//! Backends:
//! - `MemoryStore`: a `BTreeMap` in process memory (volatile)
//! - `FileStore`: a JSON object file of string values
//! - `RedbStore`: a redb database with ACID writes
//!
//! `StorageBackend` selects one of them at runtime.

mod file;
mod memory;
mod redb_store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::CartError;
use std::path::Path;

// =============================================================================
// KEYVALUESTORE TRAIT
// =============================================================================

/// Whole-value key-value storage.
///
/// There are no partial reads or writes: `set` replaces the entire value
/// and a later `get` returns exactly those bytes.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError>;

    /// Replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError> {
        (**self).set(key, value)
    }
}

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Storage backend chosen at runtime.
#[derive(Debug)]
pub enum StorageBackend {
    /// Process memory (fast, volatile).
    InMemory(MemoryStore),
    /// Single JSON file rewritten on every `set`.
    File(FileStore),
    /// Disk-backed redb database (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbStore holds a database handle; clone the cart snapshot instead.

impl StorageBackend {
    /// Open a backend by name: `"memory"`, `"file"` or `"redb"`.
    ///
    /// `path` is ignored for the memory backend.
    pub fn open(kind: &str, path: impl AsRef<Path>) -> Result<Self, CartError> {
        match kind {
            "memory" => Ok(Self::InMemory(MemoryStore::new())),
            "file" => Ok(Self::File(FileStore::new(path.as_ref()))),
            "redb" => RedbStore::open(path).map(Self::Persistent),
            other => Err(CartError::IoError(format!(
                "Unknown storage backend '{}' (expected memory, file or redb)",
                other
            ))),
        }
    }

    /// Name of the backend, as accepted by [`StorageBackend::open`].
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "memory",
            Self::File(_) => "file",
            Self::Persistent(_) => "redb",
        }
    }

    /// Whether values survive the process.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::InMemory(_))
    }
}

impl KeyValueStore for StorageBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
        match self {
            Self::InMemory(store) => store.get(key),
            Self::File(store) => store.get(key),
            Self::Persistent(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError> {
        match self {
            Self::InMemory(store) => store.set(key, value),
            Self::File(store) => store.set(key, value),
            Self::Persistent(store) => store.set(key, value),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
