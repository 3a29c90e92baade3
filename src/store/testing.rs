//! Store doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{CacheError, Result};
use crate::store::StoreClient;

/// Store whose every command fails as if the server were unreachable.
///
/// Counts the commands it receives so tests can check nothing is retried.
#[derive(Debug, Default)]
pub struct UnavailableStore {
    attempts: AtomicUsize,
}

impl UnavailableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands attempted against the store.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn refuse<T>(&self) -> Result<T> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::StoreUnavailable("connection refused".to_string()))
    }
}

impl StoreClient for UnavailableStore {
    fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        self.refuse()
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        self.refuse()
    }

    fn increment(&self, _key: &str) -> Result<i64> {
        self.refuse()
    }

    fn append_to_list(&self, _key: &str, _value: &[u8]) -> Result<()> {
        self.refuse()
    }

    fn set_with_expiry(&self, _key: &str, _value: &[u8], _ttl_seconds: u64) -> Result<()> {
        self.refuse()
    }

    fn list_range(&self, _key: &str) -> Result<Vec<Vec<u8>>> {
        self.refuse()
    }

    fn flush(&self) -> Result<()> {
        self.refuse()
    }
}
