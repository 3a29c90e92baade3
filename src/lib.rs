//! Instrumented Cache - counted, recorded key-value caching over Redis
//!
//! Provides an instrumented cache that stores scalar values under generated
//! keys while counting and recording every call, and a TTL page cache that
//! memoizes fetched pages and counts requests per URL.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheValue, InstrumentedCache, PageCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use fetch::{HttpFetcher, PageFetcher};
pub use store::{MemoryStore, RedisStore, StoreClient};
pub use tasks::spawn_cleanup_task;
