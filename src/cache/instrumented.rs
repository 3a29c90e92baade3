//! Instrumented Cache Module
//!
//! Stores scalar values under generated keys, counting and recording every
//! call to `store` and `retrieve`.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::instrument::{
    call_count, call_history, call_records, count_calls, CallRecord, Operation,
};
use crate::cache::{decode_integer, decode_text, CacheValue, RawValue};
use crate::error::Result;
use crate::store::StoreClient;

/// Method identifier under which `store` calls are counted and recorded.
pub const STORE_METHOD: &str = "InstrumentedCache::store";

/// Method identifier under which `retrieve` lookups are counted and recorded.
pub const RETRIEVE_METHOD: &str = "InstrumentedCache::retrieve";

/// Applies both layers, counting outermost and history innermost.
fn instrument<A, R>(
    store: &Arc<dyn StoreClient>,
    method: &str,
    op: Operation<A, R>,
) -> Operation<A, R>
where
    A: serde::Serialize + 'static,
    R: serde::Serialize + 'static,
{
    count_calls(
        Arc::clone(store),
        method,
        call_history(Arc::clone(store), method, op),
    )
}

// == Instrumented Cache ==
/// Key-value cache whose operations are counted and recorded in the store.
///
/// All state lives in the backing store, so one instance can be shared
/// between threads behind an `Arc`.
pub struct InstrumentedCache {
    store: Arc<dyn StoreClient>,
    store_op: Operation<(CacheValue,), String>,
    retrieve_op: Operation<(String,), Option<RawValue>>,
}

impl InstrumentedCache {
    // == Constructors ==
    /// Creates a cache over `store` after flushing the whole store.
    ///
    /// The flush wipes every key in the database, including keys owned by
    /// other cache instances sharing it. Use [`InstrumentedCache::without_flush`]
    /// when the store is shared.
    pub fn new(store: Arc<dyn StoreClient>) -> Result<Self> {
        store.flush()?;
        warn!("Backing store flushed for new cache instance");
        Ok(Self::without_flush(store))
    }

    /// Creates a cache over `store`, leaving existing keys and counters intact.
    pub fn without_flush(store: Arc<dyn StoreClient>) -> Self {
        let setter = Arc::clone(&store);
        let store_op: Operation<(CacheValue,), String> = Box::new(move |(value,)| {
            let key = Uuid::new_v4().to_string();
            setter.set(&key, &value.to_bytes())?;
            Ok(key)
        });

        let getter = Arc::clone(&store);
        let retrieve_op: Operation<(String,), Option<RawValue>> =
            Box::new(move |(key,)| Ok(getter.get(&key)?.map(RawValue)));

        Self {
            store_op: instrument(&store, STORE_METHOD, store_op),
            retrieve_op: instrument(&store, RETRIEVE_METHOD, retrieve_op),
            store,
        }
    }

    // == Store ==
    /// Stores `value` under a fresh random key and returns the key.
    pub fn store(&self, value: impl Into<CacheValue>) -> Result<String> {
        (self.store_op)((value.into(),))
    }

    // == Retrieve ==
    /// Returns the raw stored bytes, or None if the key is absent.
    pub fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.retrieve_with(key, Ok)
    }

    /// Returns the stored value passed through `decode`, or None if absent.
    ///
    /// `decode` is never called for an absent key.
    pub fn retrieve_with<T, F>(&self, key: &str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        match (self.retrieve_op)((key.to_string(),))? {
            Some(RawValue(raw)) => decode(raw).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the stored value as UTF-8 text.
    pub fn retrieve_as_text(&self, key: &str) -> Result<Option<String>> {
        self.retrieve_with(key, decode_text)
    }

    /// Returns the stored value parsed as an integer.
    pub fn retrieve_as_integer(&self, key: &str) -> Result<Option<i64>> {
        self.retrieve_with(key, decode_integer)
    }

    // == Instrumentation ==
    /// Number of recorded calls to `method` since the last flush.
    pub fn call_count(&self, method: &str) -> Result<i64> {
        call_count(self.store.as_ref(), method)
    }

    /// Recorded calls to `method`, oldest first.
    pub fn history(&self, method: &str) -> Result<Vec<CallRecord>> {
        call_records(self.store.as_ref(), method)
    }

    /// Renders the call history of `method` and logs it.
    ///
    /// The first line is `<method> was called N times:`, followed by one
    /// `<method>(*<inputs>) -> <output>` line per call.
    pub fn replay(&self, method: &str) -> Result<Vec<String>> {
        let count = self.call_count(method)?;
        let mut lines = vec![format!("{} was called {} times:", method, count)];

        for record in self.history(method)? {
            let output = record
                .output
                .map(|o| o.to_string())
                .unwrap_or_else(|| "<pending>".to_string());
            lines.push(format!("{}(*{}) -> {}", method, record.inputs, output));
        }

        for line in &lines {
            info!("{}", line);
        }
        Ok(lines)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::store::testing::UnavailableStore;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::cell::Cell;
    use std::collections::HashSet;

    fn new_cache() -> (Arc<MemoryStore>, InstrumentedCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = InstrumentedCache::new(store.clone()).unwrap();
        (store, cache)
    }

    #[test]
    fn test_round_trip_all_value_types() {
        let (_, cache) = new_cache();

        let values = [
            CacheValue::from("hello"),
            CacheValue::from(b"\x00\xffraw".to_vec()),
            CacheValue::from(42),
            CacheValue::from(3.5),
        ];
        for value in values {
            let key = cache.store(value.clone()).unwrap();
            assert_eq!(cache.retrieve(&key).unwrap(), Some(value.to_bytes()));
        }
    }

    #[test]
    fn test_typed_retrieval() {
        let (_, cache) = new_cache();

        let number = cache.store(42).unwrap();
        let text = cache.store("hello").unwrap();

        assert_eq!(cache.retrieve_as_integer(&number).unwrap(), Some(42));
        assert_eq!(cache.retrieve_as_text(&text).unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_retrieve_missing_never_decodes() {
        let (_, cache) = new_cache();
        let called = Cell::new(false);

        let result = cache
            .retrieve_with("no-such-key", |raw| {
                called.set(true);
                Ok(raw)
            })
            .unwrap();

        assert_eq!(result, None);
        assert!(!called.get());
        assert_eq!(cache.retrieve_as_integer("no-such-key").unwrap(), None);
    }

    #[test]
    fn test_decode_failure_surfaces() {
        let (_, cache) = new_cache();
        let key = cache.store("not a number").unwrap();

        let result = cache.retrieve_as_integer(&key);
        assert!(matches!(result, Err(CacheError::Decode(_))));
    }

    #[test]
    fn test_keys_are_unique() {
        let (_, cache) = new_cache();
        let keys: HashSet<String> = (0..200).map(|i| cache.store(i).unwrap()).collect();
        assert_eq!(keys.len(), 200);
    }

    #[test]
    fn test_store_calls_counted_and_recorded() {
        let (_, cache) = new_cache();

        let first = cache.store("a").unwrap();
        let second = cache.store(7).unwrap();

        assert_eq!(cache.call_count(STORE_METHOD).unwrap(), 2);
        assert_eq!(
            cache.history(STORE_METHOD).unwrap(),
            vec![
                CallRecord {
                    inputs: json!(["a"]),
                    output: Some(json!(first)),
                },
                CallRecord {
                    inputs: json!([7]),
                    output: Some(json!(second)),
                },
            ]
        );
    }

    #[test]
    fn test_retrieve_calls_counted_and_recorded() {
        let (_, cache) = new_cache();
        let key = cache.store("v").unwrap();

        cache.retrieve(&key).unwrap();
        cache.retrieve_as_text("missing").unwrap();

        assert_eq!(cache.call_count(RETRIEVE_METHOD).unwrap(), 2);
        let history = cache.history(RETRIEVE_METHOD).unwrap();
        assert_eq!(history[0].inputs, json!([key]));
        assert_eq!(history[0].output, Some(json!("v")));
        assert_eq!(history[1].output, Some(json!(null)));
    }

    #[test]
    fn test_uncalled_method_counts_zero() {
        let (_, cache) = new_cache();
        assert_eq!(cache.call_count(STORE_METHOD).unwrap(), 0);
        assert!(cache.history(STORE_METHOD).unwrap().is_empty());
    }

    #[test]
    fn test_new_flushes_previous_state() {
        let store = Arc::new(MemoryStore::new());
        let first = InstrumentedCache::new(store.clone()).unwrap();
        let key = first.store("old").unwrap();

        let second = InstrumentedCache::new(store.clone()).unwrap();

        assert_eq!(second.retrieve(&key).unwrap(), None);
        // The lookup above is the only call the fresh instance has seen
        assert_eq!(second.call_count(STORE_METHOD).unwrap(), 0);
        assert_eq!(second.call_count(RETRIEVE_METHOD).unwrap(), 1);
    }

    #[test]
    fn test_without_flush_keeps_state() {
        let store = Arc::new(MemoryStore::new());
        let first = InstrumentedCache::new(store.clone()).unwrap();
        let key = first.store("kept").unwrap();

        let second = InstrumentedCache::without_flush(store);

        assert_eq!(second.retrieve_as_text(&key).unwrap(), Some("kept".to_string()));
        assert_eq!(second.call_count(STORE_METHOD).unwrap(), 1);
    }

    #[test]
    fn test_replay_format() {
        let (_, cache) = new_cache();
        let key = cache.store("foo").unwrap();

        let lines = cache.replay(STORE_METHOD).unwrap();

        assert_eq!(
            lines,
            vec![
                "InstrumentedCache::store was called 1 times:".to_string(),
                format!("InstrumentedCache::store(*[\"foo\"]) -> \"{}\"", key),
            ]
        );
    }

    #[test]
    fn test_store_failure_propagates() {
        let cache = InstrumentedCache::without_flush(Arc::new(MemoryStore::new()));
        // A list under the counter key makes INCR fail before anything else runs
        cache.store.append_to_list(STORE_METHOD, b"x").unwrap();

        let result = cache.store("value");
        assert!(matches!(result, Err(CacheError::StoreCommand(_))));
    }

    #[test]
    fn test_unavailable_store_surfaces_unchanged() {
        let store = Arc::new(UnavailableStore::new());
        let cache = InstrumentedCache::without_flush(store.clone());

        let stored = cache.store("value");
        assert!(matches!(stored, Err(CacheError::StoreUnavailable(ref m)) if m == "connection refused"));
        let retrieved = cache.retrieve_as_text("some-key");
        assert!(matches!(retrieved, Err(CacheError::StoreUnavailable(_))));

        // Each call stops at its first command, the counter increment
        assert_eq!(store.attempts(), 2);
        assert!(matches!(
            InstrumentedCache::new(store),
            Err(CacheError::StoreUnavailable(_))
        ));
    }
}
