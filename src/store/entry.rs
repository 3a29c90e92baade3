//! Store Entry Module
//!
//! Defines the structure for individual in-memory store entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

// == Entry Value ==
/// Payload held under a key: a plain byte string or an ordered list.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
}

// == Store Entry ==
/// Represents a single store entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: EntryValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructors ==
    /// Creates an entry that never expires.
    pub fn new(value: EntryValue) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates an entry that expires `ttl_seconds` from now.
    ///
    /// Returns None when the TTL is zero or the expiry time does not fit in
    /// a millisecond timestamp, the cases Redis rejects as an invalid expire
    /// time.
    pub fn expiring(value: EntryValue, ttl_seconds: u64) -> Option<Self> {
        if ttl_seconds == 0 {
            return None;
        }
        let expires_at = ttl_seconds
            .checked_mul(1000)
            .and_then(|ttl_ms| current_timestamp_ms().checked_add(ttl_ms))?;

        Some(Self {
            value,
            expires_at: Some(expires_at),
        })
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// the expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
