//! In-memory key-value storage with an optional byte quota.

use super::{validate_key, KeyValueStorage, StorageError, StorageResult};
use std::collections::BTreeMap;

/// `BTreeMap`-backed storage.
///
/// The quota counts key bytes plus value bytes across all entries, the same
/// accounting browsers apply to local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Vec<u8>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage that rejects writes growing usage past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        if let Some(quota) = self.quota_bytes {
            let current = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let requested = self.used_bytes() - current + key.len() + value.len();
            if requested > quota {
                return Err(StorageError::QuotaExceeded { requested, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}
