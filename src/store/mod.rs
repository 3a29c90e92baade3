//! Store Module
//!
//! Synchronous access to the backing key-value service.
//!
//! Commands map one-to-one onto the Redis protocol:
//! `SET`, `SETEX`, `GET`, `INCR`, `RPUSH`, `LRANGE`, `FLUSHDB`.

mod entry;
mod memory;
mod redis_store;

#[cfg(test)]
pub(crate) mod testing;

pub use entry::{EntryValue, StoreEntry};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::error::Result;

// == Store Client Trait ==
/// Thin, non-caching handle to a key-value store.
///
/// Every method is a single round trip. `increment` and `append_to_list`
/// must be atomic with respect to other callers of the same store.
pub trait StoreClient: Send + Sync {
    /// Unconditionally overwrites `key` with `value` (SET).
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Returns the stored bytes, or None if never set or expired (GET).
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Increments the counter at `key`, creating it at 0, and returns the new value (INCR).
    fn increment(&self, key: &str) -> Result<i64>;

    /// Appends `value` to the list at `key` (RPUSH).
    fn append_to_list(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Overwrites `key` with a value that becomes unreadable after `ttl_seconds` (SETEX).
    fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()>;

    /// Returns the whole list at `key`, empty if absent (LRANGE key 0 -1).
    fn list_range(&self, key: &str) -> Result<Vec<Vec<u8>>>;

    /// Removes every key from the current database (FLUSHDB).
    fn flush(&self) -> Result<()>;
}
