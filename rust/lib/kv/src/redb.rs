use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn storage(e: impl std::fmt::Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database. Each mutation runs in its own write transaction.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(storage)?;

        // Ensure the table exists so that read transactions never fail on it.
        let write_txn = db.begin_write().map_err(storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;

        debug!("RedbStore: opened {:?}", path);
        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(storage(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            table.insert(key, value).map_err(storage)?;
        }
        write_txn.commit().map_err(storage)?;
        Ok(())
    }

    fn insert_new(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        let inserted = {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            if table.get(key).map_err(storage)?.is_some() {
                false
            } else {
                table.insert(key, value).map_err(storage)?;
                true
            }
        };
        if !inserted {
            write_txn.abort().map_err(storage)?;
            return Ok(false);
        }
        write_txn.commit().map_err(storage)?;
        Ok(true)
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(&[u8]) -> Option<Vec<u8>>,
    ) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        // None: key absent. Some(false): left unchanged. Some(true): rewritten.
        let written = {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            let current = table
                .get(key)
                .map_err(storage)?
                .map(|guard| guard.value().to_vec());
            match current {
                None => None,
                Some(old) => match f(&old) {
                    Some(new) => {
                        table.insert(key, new.as_slice()).map_err(storage)?;
                        Some(true)
                    }
                    None => Some(false),
                },
            }
        };
        match written {
            Some(true) => {
                write_txn.commit().map_err(storage)?;
                Ok(true)
            }
            Some(false) => {
                write_txn.abort().map_err(storage)?;
                Ok(true)
            }
            None => {
                write_txn.abort().map_err(storage)?;
                Ok(false)
            }
        }
    }

    fn take(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let write_txn = self.db.begin_write().map_err(storage)?;
        let removed = {
            let mut table = write_txn.open_table(TABLE).map_err(storage)?;
            let old = table.remove(key).map_err(storage)?;
            old.map(|guard| guard.value().to_vec())
        };
        if removed.is_none() {
            write_txn.abort().map_err(storage)?;
            return Ok(None);
        }
        write_txn.commit().map_err(storage)?;
        Ok(removed)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(storage)?;
        let table = read_txn.open_table(TABLE).map_err(storage)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(storage)?;

        for entry in iter {
            let (key, value) = entry.map_err(storage)?;
            let key = key.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key, value.value().to_vec()));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    #[test]
    fn set_get_roundtrip() {
        let (store, _dir) = open_temp();
        store.set("a:1", b"one").unwrap();
        assert_eq!(store.get("a:1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.get("a:2").unwrap(), None);
    }

    #[test]
    fn take_returns_old_value_once() {
        let (store, _dir) = open_temp();
        store.set("a:1", b"one").unwrap();

        assert_eq!(store.take("a:1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.take("a:1").unwrap(), None);
        assert_eq!(store.get("a:1").unwrap(), None);
    }

    #[test]
    fn insert_new_never_overwrites() {
        let (store, _dir) = open_temp();
        assert!(store.insert_new("a:1", b"one").unwrap());
        assert!(!store.insert_new("a:1", b"two").unwrap());
        assert_eq!(store.get("a:1").unwrap(), Some(b"one".to_vec()));
    }

    #[test]
    fn update_rewrites_existing_key() {
        let (store, _dir) = open_temp();
        store.set("a:1", b"one").unwrap();

        let found = store
            .update("a:1", &mut |old| {
                let mut next = old.to_vec();
                next.extend_from_slice(b"+");
                Some(next)
            })
            .unwrap();
        assert!(found);
        assert_eq!(store.get("a:1").unwrap(), Some(b"one+".to_vec()));

        assert!(store.update("a:1", &mut |_| None).unwrap());
        assert_eq!(store.get("a:1").unwrap(), Some(b"one+".to_vec()));
    }

    #[test]
    fn update_of_missing_key_writes_nothing() {
        let (store, _dir) = open_temp();
        let mut called = false;
        let found = store
            .update("a:1", &mut |_| {
                called = true;
                Some(b"new".to_vec())
            })
            .unwrap();
        assert!(!found);
        assert!(!called);
        assert_eq!(store.get("a:1").unwrap(), None);
    }

    #[test]
    fn update_after_take_does_not_restore() {
        let (store, _dir) = open_temp();
        store.set("a:1", b"one").unwrap();
        assert!(store.take("a:1").unwrap().is_some());
        assert!(!store.update("a:1", &mut |old| Some(old.to_vec())).unwrap());
        assert!(store.scan("a:").unwrap().is_empty());
    }

    #[test]
    fn scan_stops_at_prefix_boundary() {
        let (store, _dir) = open_temp();
        store.set("a:2", b"2").unwrap();
        store.set("a:1", b"1").unwrap();
        store.set("b:1", b"x").unwrap();
        store.set("a", b"bare").unwrap();

        let keys: Vec<String> = store
            .scan("a:")
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["a:1".to_string(), "a:2".to_string()]);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persist.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("k", b"v").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"v".to_vec()));
    }
}
