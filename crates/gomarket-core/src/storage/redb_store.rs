//! # redb-backed Key-Value Store
//!
//! A disk-backed store using the redb embedded database, providing:
//! - ACID transactions (one write transaction per `set`)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)

use super::KeyValueStore;
use crate::CartError;
use redb::{Database, ReadableDatabase, TableDefinition};
use std::path::Path;

/// Table for entries: key string -> raw value bytes
const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// A disk-backed key-value store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let db = Database::create(path.as_ref()).map_err(io_error)?;

        // Create the table up front so reads never hit a missing table.
        let write_txn = db.begin_write().map_err(io_error)?;
        {
            let _ = write_txn.open_table(ENTRIES).map_err(io_error)?;
        }
        write_txn.commit().map_err(io_error)?;

        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), CartError> {
        self.db.compact().map_err(io_error)?;
        Ok(())
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CartError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let table = read_txn.open_table(ENTRIES).map_err(io_error)?;
        let value = table.get(key).map_err(io_error)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), CartError> {
        let write_txn = self.db.begin_write().map_err(io_error)?;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(io_error)?;
            table.insert(key, value).map_err(io_error)?;
        }
        write_txn.commit().map_err(io_error)
    }
}

fn io_error(e: impl std::fmt::Display) -> CartError {
    CartError::IoError(e.to_string())
}
