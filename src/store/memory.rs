//! Memory Store Module
//!
//! In-process store with Redis command semantics and TTL expiration.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{CacheError, Result};
use crate::store::{EntryValue, StoreClient, StoreEntry};

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

// == Memory Store ==
/// In-memory backing store.
///
/// Each command takes the map lock once, so `increment` and `append_to_list`
/// are atomic across threads. Expired entries are dropped lazily on access and
/// in bulk by [`MemoryStore::cleanup_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Key-value storage
    entries: Mutex<HashMap<String, StoreEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, StoreEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Internal("memory store lock poisoned".to_string()))
    }

    /// Returns the live entry under `key`, removing it first if it expired.
    fn live<'a>(
        entries: &'a mut HashMap<String, StoreEntry>,
        key: &str,
    ) -> Option<&'a mut StoreEntry> {
        if entries.get(key).is_some_and(StoreEntry::is_expired) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        Ok(before - entries.len())
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries().map(|entries| entries.len()).unwrap_or(0)
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoreClient for MemoryStore {
    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries()?;
        entries.insert(
            key.to_string(),
            StoreEntry::new(EntryValue::Bytes(value.to_vec())),
        );
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries()?;
        match Self::live(&mut entries, key) {
            None => Ok(None),
            Some(entry) => match &entry.value {
                EntryValue::Bytes(bytes) => Ok(Some(bytes.clone())),
                EntryValue::List(_) => Err(CacheError::StoreCommand(WRONG_TYPE.to_string())),
            },
        }
    }

    fn increment(&self, key: &str) -> Result<i64> {
        let mut entries = self.entries()?;
        let Some(entry) = Self::live(&mut entries, key) else {
            entries.insert(
                key.to_string(),
                StoreEntry::new(EntryValue::Bytes(b"1".to_vec())),
            );
            return Ok(1);
        };

        let EntryValue::Bytes(bytes) = &entry.value else {
            return Err(CacheError::StoreCommand(WRONG_TYPE.to_string()));
        };
        let current = std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .ok_or_else(|| {
                CacheError::StoreCommand("value is not an integer or out of range".to_string())
            })?;
        let next = current.checked_add(1).ok_or_else(|| {
            CacheError::StoreCommand("increment or decrement would overflow".to_string())
        })?;

        // INCR keeps any TTL already on the key
        entry.value = EntryValue::Bytes(next.to_string().into_bytes());
        Ok(next)
    }

    fn append_to_list(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries()?;
        match Self::live(&mut entries, key) {
            Some(entry) => match &mut entry.value {
                EntryValue::List(items) => items.push(value.to_vec()),
                EntryValue::Bytes(_) => {
                    return Err(CacheError::StoreCommand(WRONG_TYPE.to_string()))
                }
            },
            None => {
                entries.insert(
                    key.to_string(),
                    StoreEntry::new(EntryValue::List(vec![value.to_vec()])),
                );
            }
        }
        Ok(())
    }

    fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let entry = StoreEntry::expiring(EntryValue::Bytes(value.to_vec()), ttl_seconds)
            .ok_or_else(|| {
                CacheError::StoreCommand("invalid expire time in 'setex' command".to_string())
            })?;
        self.entries()?.insert(key.to_string(), entry);
        Ok(())
    }

    fn list_range(&self, key: &str) -> Result<Vec<Vec<u8>>> {
        let mut entries = self.entries()?;
        match Self::live(&mut entries, key) {
            None => Ok(Vec::new()),
            Some(entry) => match &entry.value {
                EntryValue::List(items) => Ok(items.clone()),
                EntryValue::Bytes(_) => Err(CacheError::StoreCommand(WRONG_TYPE.to_string())),
            },
        }
    }

    fn flush(&self) -> Result<()> {
        self.entries()?.clear();
        Ok(())
    }
}
