//! Cache Module
//!
//! Instrumented key-value cache and TTL page cache over a [`StoreClient`].
//!
//! [`StoreClient`]: crate::store::StoreClient

pub mod instrument;
mod instrumented;
mod page;
mod value;


// Re-export public types
pub use instrument::{CallRecord, Operation};
pub use instrumented::{InstrumentedCache, RETRIEVE_METHOD, STORE_METHOD};
pub use page::{cache_key, count_key, PageCache, DEFAULT_PAGE_TTL};
pub use value::{decode_integer, decode_text, CacheValue, RawValue};
