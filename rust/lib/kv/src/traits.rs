use crate::error::KVError;

/// KVStore provides a flat key-value storage interface.
///
/// Keys follow a namespaced convention: `{module}:{resource}:{id}`, e.g.
/// `cylinder:cylinder:3f2a...`. Every call is atomic on its own; there are
/// no multi-key transactions. Read-modify-write on a single key goes through
/// `insert_new` or `update` so no other writer can commit in between.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Set a key only if it does not exist yet.
    /// Returns false (and writes nothing) if the key is already present.
    fn insert_new(&self, key: &str, value: &[u8]) -> Result<bool, KVError>;

    /// Read the current value and replace it with what `f` returns, in one
    /// write. `f` returning None leaves the value as it was.
    /// Returns false (and never calls `f`) if the key does not exist.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(&[u8]) -> Option<Vec<u8>>,
    ) -> Result<bool, KVError>;

    /// Remove a key and return the value it held, in one write.
    /// Returns None (and writes nothing) if the key does not exist.
    fn take(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Scan all keys matching a prefix. Returns (key, value) pairs sorted by key.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
