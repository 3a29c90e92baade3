//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.
//!
//! The cache components talk to the store synchronously, so every handler
//! runs its cache call on the blocking thread pool.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{InstrumentedCache, PageCache, RawValue};
use crate::error::{CacheError, Result};
use crate::models::{
    AccessCountResponse, CallsResponse, Decoding, HealthResponse, PageQuery, PageResponse,
    RetrieveQuery, RetrieveResponse, StoreRequest, StoreResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Instrumented key-value cache
    pub cache: Arc<InstrumentedCache>,
    /// TTL page cache
    pub pages: Arc<PageCache>,
}

impl AppState {
    /// Creates a new AppState from the two cache components.
    pub fn new(cache: InstrumentedCache, pages: PageCache) -> Self {
        Self {
            cache: Arc::new(cache),
            pages: Arc::new(pages),
        }
    }
}

/// Runs a synchronous cache call off the async executor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CacheError::Internal(e.to_string()))?
}

/// Handler for POST /store
///
/// Stores a value under a generated key.
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.cache.clone();
    let key = blocking(move || cache.store(req.value)).await?;

    Ok(Json(StoreResponse::new(key)))
}

/// Handler for GET /retrieve/:key
///
/// Retrieves a value, decoded according to the `as` query parameter.
pub async fn retrieve_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Json<RetrieveResponse>> {
    let cache = state.cache.clone();
    let lookup = key.clone();
    let value: Option<Value> = blocking(move || match query.decoding {
        Decoding::Raw => cache.retrieve_with(&lookup, |raw| {
            serde_json::to_value(RawValue(raw)).map_err(|e| CacheError::Internal(e.to_string()))
        }),
        Decoding::Text => Ok(cache.retrieve_as_text(&lookup)?.map(Value::from)),
        Decoding::Int => Ok(cache.retrieve_as_integer(&lookup)?.map(Value::from)),
    })
    .await?;

    match value {
        Some(value) => Ok(Json(RetrieveResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /page?url=
///
/// Returns page content through the TTL page cache.
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let pages = state.pages.clone();
    let url = query.url.clone();
    let content = blocking(move || pages.get_page(&url)).await?;

    Ok(Json(PageResponse::new(query.url, content)))
}

/// Handler for GET /page/count?url=
///
/// Returns how many times a URL has been requested.
pub async fn page_count_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AccessCountResponse>> {
    let pages = state.pages.clone();
    let url = query.url.clone();
    let count = blocking(move || pages.access_count(&url)).await?;

    Ok(Json(AccessCountResponse {
        url: query.url,
        count,
    }))
}

/// Handler for GET /calls/:method
///
/// Returns the call count and recorded history of an instrumented method.
pub async fn calls_handler(
    State(state): State<AppState>,
    Path(method): Path<String>,
) -> Result<Json<CallsResponse>> {
    let cache = state.cache.clone();
    let lookup = method.clone();
    let (count, calls) = blocking(move || {
        let count = cache.call_count(&lookup)?;
        let calls = cache.history(&lookup)?;
        Ok((count, calls))
    })
    .await?;

    Ok(Json(CallsResponse {
        method,
        count,
        calls,
    }))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::STORE_METHOD;
    use crate::fetch::FetchError;
    use crate::store::{MemoryStore, StoreClient};

    fn test_state() -> AppState {
        let store: Arc<dyn StoreClient> = Arc::new(MemoryStore::new());
        let cache = InstrumentedCache::new(store.clone()).unwrap();
        let pages = PageCache::new(store, |url: &str| -> std::result::Result<String, FetchError> {
            Ok(format!("<p>{}</p>", url))
        });
        AppState::new(cache, pages)
    }

    fn store_request(value: serde_json::Value) -> StoreRequest {
        serde_json::from_value(serde_json::json!({ "value": value })).unwrap()
    }

    #[tokio::test]
    async fn test_store_and_retrieve_handler() {
        let state = test_state();

        let stored = store_handler(State(state.clone()), Json(store_request("hello".into())))
            .await
            .unwrap();

        let result = retrieve_handler(
            State(state.clone()),
            Path(stored.key.clone()),
            Query(RetrieveQuery {
                decoding: Decoding::Text,
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.value, Value::from("hello"));
    }

    #[tokio::test]
    async fn test_retrieve_integer() {
        let state = test_state();

        let stored = store_handler(State(state.clone()), Json(store_request(42.into())))
            .await
            .unwrap();

        let result = retrieve_handler(
            State(state),
            Path(stored.key.clone()),
            Query(RetrieveQuery {
                decoding: Decoding::Int,
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.value, Value::from(42));
    }

    #[tokio::test]
    async fn test_retrieve_nonexistent_key() {
        let state = test_state();

        let result = retrieve_handler(
            State(state),
            Path("nonexistent".to_string()),
            Query(RetrieveQuery::default()),
        )
        .await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_page_handler_counts_requests() {
        let state = test_state();
        let query = || {
            Query(PageQuery {
                url: "http://x".to_string(),
            })
        };

        let first = page_handler(State(state.clone()), query()).await.unwrap();
        page_handler(State(state.clone()), query()).await.unwrap();
        let count = page_count_handler(State(state), query()).await.unwrap();

        assert_eq!(first.content, "<p>http://x</p>");
        assert_eq!(count.count, 2);
    }

    #[tokio::test]
    async fn test_page_handler_rejects_bad_url() {
        let state = test_state();

        let result = page_handler(
            State(state),
            Query(PageQuery {
                url: "file:///etc/passwd".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_calls_handler() {
        let state = test_state();
        store_handler(State(state.clone()), Json(store_request("a".into())))
            .await
            .unwrap();

        let response = calls_handler(State(state), Path(STORE_METHOD.to_string()))
            .await
            .unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
