use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::KVError;
use crate::traits::KVStore;

/// MemoryStore keeps every entry in a `BTreeMap` behind a `RwLock`.
///
/// Nothing is persisted; contents are lost when the store is dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all prefixes.
    pub fn len(&self) -> usize {
        self.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>, KVError> {
        self.entries
            .read()
            .map_err(|_| KVError::Storage("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>, KVError> {
        self.entries
            .write()
            .map_err(|_| KVError::Storage("memory store lock poisoned".into()))
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        self.write()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn insert_new(&self, key: &str, value: &[u8]) -> Result<bool, KVError> {
        let mut entries = self.write()?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(&[u8]) -> Option<Vec<u8>>,
    ) -> Result<bool, KVError> {
        let mut entries = self.write()?;
        let Some(current) = entries.get_mut(key) else {
            return Ok(false);
        };
        if let Some(next) = f(current.as_slice()) {
            *current = next;
        }
        Ok(true)
    }

    fn take(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        Ok(self.write()?.remove(key))
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let entries = self.read()?;
        let mut results = Vec::new();
        for (key, value) in entries.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.clone(), value.clone()));
        }
        Ok(results)
    }
}
