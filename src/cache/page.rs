//! Page Cache Module
//!
//! Memoizes fetched page content for a fixed TTL and counts every request
//! per URL.

use std::num::NonZeroU64;
use std::sync::Arc;

use tracing::debug;

use crate::cache::decode_text;
use crate::cache::instrument::Operation;
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::store::StoreClient;

/// Seconds a fetched page stays readable from the cache.
pub const DEFAULT_PAGE_TTL: NonZeroU64 = match NonZeroU64::new(10) {
    Some(ttl) => ttl,
    None => panic!("default page TTL must be non-zero"),
};

/// Store key of the access counter for `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

/// Store key of the cached content for `url`.
pub fn cache_key(url: &str) -> String {
    format!("cache:{}", url)
}

// == Access Tracking Layer ==
/// Wraps `op` so every call first increments `count:<url>`, hit or miss.
pub fn track_accesses(
    store: Arc<dyn StoreClient>,
    op: Operation<String, String>,
) -> Operation<String, String> {
    Box::new(move |url| {
        store.increment(&count_key(&url))?;
        op(url)
    })
}

// == Expiring Cache Layer ==
/// Wraps `op` so its result is served from `cache:<url>` while that entry lives.
///
/// On a miss the result of `op` is written with a `ttl_seconds` expiry.
/// Errors from `op` are returned as-is and nothing is written.
pub fn cache_with_expiry(
    store: Arc<dyn StoreClient>,
    ttl_seconds: NonZeroU64,
    op: Operation<String, String>,
) -> Operation<String, String> {
    Box::new(move |url| {
        let key = cache_key(&url);
        if let Some(cached) = store.get(&key)? {
            debug!("Page cache hit for {}", url);
            return decode_text(cached);
        }

        debug!("Page cache miss for {}", url);
        let content = op(url)?;
        store.set_with_expiry(&key, content.as_bytes(), ttl_seconds.get())?;
        Ok(content)
    })
}

// == Page Cache ==
/// Fetches pages through a time-bounded cache.
pub struct PageCache {
    store: Arc<dyn StoreClient>,
    get_page_op: Operation<String, String>,
    ttl_seconds: NonZeroU64,
}

impl PageCache {
    /// Creates a page cache with the default 10 second TTL.
    pub fn new(store: Arc<dyn StoreClient>, fetcher: impl PageFetcher + 'static) -> Self {
        Self::with_ttl(store, fetcher, DEFAULT_PAGE_TTL)
    }

    /// Creates a page cache whose entries expire after `ttl_seconds`.
    ///
    /// The TTL is non-zero because the store rejects a zero expiry, which
    /// would fail every miss after the fetch already ran.
    pub fn with_ttl(
        store: Arc<dyn StoreClient>,
        fetcher: impl PageFetcher + 'static,
        ttl_seconds: NonZeroU64,
    ) -> Self {
        let fetch: Operation<String, String> = Box::new(move |url| Ok(fetcher.fetch(&url)?));
        let get_page_op = track_accesses(
            Arc::clone(&store),
            cache_with_expiry(Arc::clone(&store), ttl_seconds, fetch),
        );

        Self {
            store,
            get_page_op,
            ttl_seconds,
        }
    }

    /// Returns the content of `url`, fetching it only when no live copy is cached.
    pub fn get_page(&self, url: &str) -> Result<String> {
        (self.get_page_op)(url.to_string())
    }

    /// Number of `get_page` calls made for `url`.
    pub fn access_count(&self, url: &str) -> Result<i64> {
        match self.store.get(&count_key(url))? {
            None => Ok(0),
            Some(raw) => crate::cache::decode_integer(raw),
        }
    }

    /// Expiry applied to cached pages, in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds.get()
    }
}
