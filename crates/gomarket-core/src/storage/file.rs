//! # File-backed Key-Value Store
//!
//! Keeps every key in one JSON object file, `{"<key>": "<value>", ...}`.
//! Values must be UTF-8, which holds for the JSON cart snapshot.
//!
//! Each `set` rewrites the whole file: the new content goes to a sibling
//! `*.tmp` file that is then renamed over the original, so a reader never
//! sees a half-written file.

use super::KeyValueStore;
use crate::CartError;
use crate::primitives::MAX_SNAPSHOT_SIZE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key-value store persisted as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Use the file at `path`. The file is created on the first `set`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CartError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let metadata = std::fs::metadata(&self.path)
            .map_err(|e| CartError::IoError(format!("Cannot read file metadata: {}", e)))?;
        if metadata.len() > MAX_SNAPSHOT_SIZE as u64 {
            return Err(CartError::IoError(format!(
                "File size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_SNAPSHOT_SIZE
            )));
        }

        let data = std::fs::read(&self.path)
            .map_err(|e| CartError::IoError(format!("Read {}: {}", self.path.display(), e)))?;
        if data.is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&data).map_err(|e| {
            CartError::DeserializationError(format!(
                "Store file {} is not a JSON object of strings: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CartError> {
        let data = serde_json::to_vec_pretty(entries)
            .map_err(|e| CartError::SerializationError(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &data)
            .map_err(|e| CartError::IoError(format!("Write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            CartError::IoError(format!(
                "Rename {} -> {}: {}",
                tmp.display(),
                self.path.display(),
                e
            ))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
        Ok(self
            .read_entries()?
            .remove(key)
            .map(String::into_bytes))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError> {
        let value = std::str::from_utf8(value)
            .map_err(|e| CartError::SerializationError(format!("Value is not UTF-8: {}", e)))?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(CartError::DeserializationError(e)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Replacing unreadable store file"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}
